//! Random-byte providers for nonces and metadata noise.

use chacha20poly1305::aead::rand_core::RngCore;
use chacha20poly1305::aead::OsRng;

use crate::error::{Result, TokenError};

/// Source of cryptographically secure random bytes.
///
/// Implementations are shared across threads by the tokenizer, so `fill`
/// takes `&self`.
pub trait Entropy: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<()>;

    fn next_u16(&self) -> Result<u16> {
        let mut bytes = [0u8; 2];
        self.fill(&mut bytes)?;
        Ok(u16::from_le_bytes(bytes))
    }
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(buf).map_err(|e| {
            tracing::error!("OS random source failed: {e}");
            TokenError::Entropy(e.to_string())
        })
    }
}

impl<E: Entropy + ?Sized> Entropy for &E {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        (**self).fill(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_entropy_fills_buffer() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        OsEntropy.fill(&mut a).unwrap();
        OsEntropy.fill(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn next_u16_reads_little_endian() {
        struct Fixed;
        impl Entropy for Fixed {
            fn fill(&self, buf: &mut [u8]) -> Result<()> {
                for (i, b) in buf.iter_mut().enumerate() {
                    *b = i as u8 + 1;
                }
                Ok(())
            }
        }
        assert_eq!(Fixed.next_u16().unwrap(), 0x0201);
    }
}
