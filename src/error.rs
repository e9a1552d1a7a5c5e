//! Token error taxonomy.
//!
//! Integrity failures (bad tag, bad checksum, truncated ciphertext) all
//! collapse into [`TokenError::Invalid`] so a caller cannot learn which
//! check tripped. Format errors carry detail since they reveal nothing
//! about key material.

use crate::token::{Claims, Rejection};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TokenError>;

#[derive(Debug, Error)]
pub enum TokenError {
    // ─────────────────────────────────────────────────────────────────────────────
    // Key Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid token key encoding: {0}")]
    KeyEncoding(#[from] hex::FromHexError),

    #[error("invalid token key size: expected {expected} bytes, got {actual}")]
    KeySize { expected: usize, actual: usize },

    // ─────────────────────────────────────────────────────────────────────────────
    // Format Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid token length: expected {expected}, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("malformed token encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("ciphertext too short")]
    CiphertextTooShort,

    // ─────────────────────────────────────────────────────────────────────────────
    // Validation Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid token")]
    Invalid,

    #[error("expired token")]
    Expired(Claims),

    #[error("token rejected: {0}")]
    Rejected(#[from] Rejection),

    // ─────────────────────────────────────────────────────────────────────────────
    // Environment Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("secure random source unavailable: {0}")]
    Entropy(String),
}

impl TokenError {
    /// Stable error code for clients and logs.
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::KeyEncoding(_) | TokenError::KeySize { .. } => "INVALID_KEY",
            TokenError::Length { .. } => "INVALID_TOKEN_LENGTH",
            TokenError::Encoding(_) | TokenError::CiphertextTooShort => "MALFORMED_TOKEN",
            TokenError::Invalid => "INVALID_TOKEN",
            TokenError::Expired(_) => "TOKEN_EXPIRED",
            TokenError::Rejected(_) => "TOKEN_REJECTED",
            TokenError::Entropy(_) => "ENTROPY_UNAVAILABLE",
        }
    }

    /// Claims of a structurally valid but stale token.
    pub fn expired_claims(&self) -> Option<&Claims> {
        match self {
            TokenError::Expired(claims) => Some(claims),
            _ => None,
        }
    }

    /// Only an expired token can still be traded in through refresh.
    pub fn is_retryable_by_refresh(&self) -> bool {
        matches!(self, TokenError::Expired(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn integrity_failures_share_one_message() {
        assert_eq!(TokenError::Invalid.to_string(), "invalid token");
        assert_eq!(TokenError::Invalid.code(), "INVALID_TOKEN");
    }

    #[test]
    fn expired_exposes_claims() {
        let claims = Claims {
            id: 7,
            addt: 0x12,
            expire_at: Utc.timestamp_millis_opt(1_000).unwrap(),
        };
        let err = TokenError::Expired(claims);
        assert_eq!(err.expired_claims(), Some(&claims));
        assert!(err.is_retryable_by_refresh());
        assert!(!TokenError::Invalid.is_retryable_by_refresh());
        assert!(TokenError::CiphertextTooShort.expired_claims().is_none());
    }

    #[test]
    fn key_size_reports_both_lengths() {
        let err = TokenError::KeySize {
            expected: 32,
            actual: 16,
        };
        assert_eq!(
            err.to_string(),
            "invalid token key size: expected 32 bytes, got 16"
        );
    }

    #[test]
    fn rejection_is_surfaced_verbatim() {
        let err: TokenError = Rejection::new("wrong audience").into();
        assert_eq!(err.to_string(), "token rejected: wrong audience");
        assert_eq!(err.code(), "TOKEN_REJECTED");
    }
}
