//! XChaCha20-Poly1305 framing.
//!
//! Every sealed buffer is `nonce || ciphertext || tag` with a fresh random
//! 192-bit nonce, wide enough that pure random generation never needs a
//! counter. The 16-bit token metadata is bound as associated data in its
//! 2-byte little-endian form.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};

use super::entropy::Entropy;
use crate::error::{Result, TokenError};

/// Key size for XChaCha20-Poly1305 (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;

/// Extended nonce size (24 bytes / 192 bits).
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag size.
pub const TAG_LEN: usize = 16;

/// AEAD engine bound to a single symmetric key.
#[derive(Clone)]
pub struct Sealer {
    cipher: XChaCha20Poly1305,
}

impl Sealer {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != KEY_LEN {
            return Err(TokenError::KeySize {
                expected: KEY_LEN,
                actual: key.len(),
            });
        }
        let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| TokenError::KeySize {
            expected: KEY_LEN,
            actual: key.len(),
        })?;
        Ok(Self { cipher })
    }

    /// Encrypt `plaintext`, returning `nonce || ciphertext || tag`.
    pub fn seal(&self, addt: u16, plaintext: &[u8], entropy: &impl Entropy) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        entropy.fill(&mut nonce)?;

        let ad = addt.to_le_bytes();
        // Only fails for messages beyond the cipher's length limit.
        let ciphertext = self
            .cipher
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &ad,
                },
            )
            .map_err(|_| TokenError::Invalid)?;

        let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        framed.extend_from_slice(&nonce);
        framed.extend_from_slice(&ciphertext);
        Ok(framed)
    }

    /// Split and authenticate a framed buffer produced by [`Sealer::seal`].
    pub fn open(&self, addt: u16, framed: &[u8]) -> Result<Vec<u8>> {
        if framed.len() < NONCE_LEN {
            return Err(TokenError::CiphertextTooShort);
        }
        let (nonce, ciphertext) = framed.split_at(NONCE_LEN);
        // An empty body has no tag to check; never hand back unauthenticated output.
        if ciphertext.is_empty() {
            return Err(TokenError::Invalid);
        }

        let ad = addt.to_le_bytes();
        self.cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: &ad,
                },
            )
            .map_err(|_| TokenError::Invalid)
    }
}
