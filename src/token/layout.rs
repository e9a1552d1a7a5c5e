//! Fixed byte layouts.
//!
//! ```text
//! outer:     metadata(2, LE) || nonce(24) || ciphertext(24 + 16)
//! plaintext: expiry_ms(8, LE) || subject_id(8, LE) || crc64(8, BE)
//! ```
//!
//! The checksum is big-endian while every other integer is little-endian.
//! Existing tokens were issued that way, so the asymmetry is kept.

use super::aead::{NONCE_LEN, TAG_LEN};
use super::checksum::Crc64Table;
use crate::error::{Result, TokenError};

/// Cleartext metadata width.
pub const METADATA_LEN: usize = 2;

/// Signed plaintext record width.
pub const PLAINTEXT_LEN: usize = 24;

/// Bytes covered by the checksum.
const SIGNED_LEN: usize = 16;

/// Decoded token width.
pub const RAW_LEN: usize = METADATA_LEN + NONCE_LEN + PLAINTEXT_LEN + TAG_LEN;

/// Padded base64 width of a token.
pub const TOKEN_LEN: usize = RAW_LEN.div_ceil(3) * 4;

/// The record sealed inside every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plaintext {
    pub expiry_ms: i64,
    pub subject: u64,
}

impl Plaintext {
    pub fn pack(&self, table: &Crc64Table) -> [u8; PLAINTEXT_LEN] {
        let mut buf = [0u8; PLAINTEXT_LEN];
        buf[..8].copy_from_slice(&(self.expiry_ms as u64).to_le_bytes());
        buf[8..16].copy_from_slice(&self.subject.to_le_bytes());
        let crc = table.checksum(&buf[..SIGNED_LEN]);
        buf[16..].copy_from_slice(&crc.to_be_bytes());
        buf
    }

    /// Parse an opened record, rejecting it unless the checksum matches.
    pub fn unpack(buf: &[u8], table: &Crc64Table) -> Result<Self> {
        if buf.len() != PLAINTEXT_LEN {
            return Err(TokenError::Invalid);
        }
        let stored = u64::from_be_bytes(read8(&buf[16..]));
        if stored != table.checksum(&buf[..SIGNED_LEN]) {
            return Err(TokenError::Invalid);
        }
        Ok(Self {
            expiry_ms: u64::from_le_bytes(read8(&buf[..8])) as i64,
            subject: u64::from_le_bytes(read8(&buf[8..16])),
        })
    }
}

/// Split a decoded token into its metadata and framed ciphertext.
pub fn split_outer(raw: &[u8]) -> Result<(u16, &[u8])> {
    if raw.len() < METADATA_LEN {
        return Err(TokenError::CiphertextTooShort);
    }
    let (metadata, framed) = raw.split_at(METADATA_LEN);
    Ok((u16::from_le_bytes([metadata[0], metadata[1]]), framed))
}

/// Join metadata and a framed ciphertext into the decoded token form.
pub fn join_outer(addt: u16, framed: &[u8]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(METADATA_LEN + framed.len());
    raw.extend_from_slice(&addt.to_le_bytes());
    raw.extend_from_slice(framed);
    raw
}

fn read8(bytes: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(&bytes[..8]);
    out
}
