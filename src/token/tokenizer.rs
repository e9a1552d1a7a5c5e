//! Token issue, validation and refresh.
//!
//! A token is `base64url(metadata || nonce || seal(expiry || id || crc64))`
//! with the metadata bound as associated data. Cheap checks (length,
//! encoding, caller predicates over the metadata) run before decryption.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};

use super::aead::Sealer;
use super::checks::{self, Check};
use super::checksum::Crc64Table;
use super::entropy::{Entropy, OsEntropy};
use super::layout::{join_outer, split_outer, Plaintext, TOKEN_LEN};
use crate::error::{Result, TokenError};

/// Claims carried by a structurally valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    /// Subject identifier.
    pub id: u64,
    /// Metadata after masking.
    pub addt: u16,
    /// Expiry, millisecond precision.
    pub expire_at: DateTime<Utc>,
}

/// Issues and checks tokens under one symmetric key.
///
/// Immutable after construction; share it freely across threads.
pub struct Tokenizer<E = OsEntropy> {
    sealer: Sealer,
    table: Crc64Table,
    entropy: E,
}

impl Tokenizer<OsEntropy> {
    /// Build from a hex-encoded 32-byte key using the OS random source.
    pub fn new(hex_key: &str) -> Result<Self> {
        Self::with_entropy(hex_key, OsEntropy)
    }
}

impl<E: Entropy> Tokenizer<E> {
    /// Build from a hex-encoded key with a caller-supplied random source.
    pub fn with_entropy(hex_key: &str, entropy: E) -> Result<Self> {
        let key = hex::decode(hex_key.trim())?;
        let sealer = Sealer::new(&key)?;
        Ok(Self {
            sealer,
            table: Crc64Table::ecma(),
            entropy,
        })
    }

    /// Mint a token for `id` expiring at `expire_at`.
    ///
    /// Bits of `addt` selected by `mask` are kept; the remaining bits are
    /// replaced with random noise.
    pub fn generate(&self, id: u64, expire_at: DateTime<Utc>, addt: u16, mask: u16) -> Result<String> {
        let noise = self.entropy.next_u16()?;
        let addt = (addt & mask) | (noise & !mask);

        let record = Plaintext {
            expiry_ms: expire_at.timestamp_millis(),
            subject: id,
        }
        .pack(&self.table);
        let framed = self.sealer.seal(addt, &record, &self.entropy)?;

        tracing::trace!(id, expire_at = %expire_at, "issued token");
        Ok(URL_SAFE.encode(join_outer(addt, &framed)))
    }

    /// Validate `token` against the current time.
    pub fn validate(&self, token: &str, mask: u16, checks: &[Check<'_>]) -> Result<Claims> {
        self.validate_at(token, mask, checks, Utc::now())
    }

    /// Validate `token` as of `now`.
    ///
    /// An expired token yields [`TokenError::Expired`] carrying its claims.
    pub fn validate_at(
        &self,
        token: &str,
        mask: u16,
        checks: &[Check<'_>],
        now: DateTime<Utc>,
    ) -> Result<Claims> {
        let claims = self.open_token(token, mask, checks)?;
        if now > claims.expire_at {
            tracing::debug!(id = claims.id, expire_at = %claims.expire_at, "token expired");
            return Err(TokenError::Expired(claims));
        }
        Ok(claims)
    }

    /// Exchange `token` for a new one expiring at `new_expire_at`.
    ///
    /// Live tokens and tokens expired for at most `valid_after` are
    /// refreshable; the new token keeps the id and masked metadata.
    pub fn refresh(
        &self,
        token: &str,
        new_expire_at: DateTime<Utc>,
        valid_after: Duration,
        mask: u16,
        checks: &[Check<'_>],
    ) -> Result<String> {
        self.refresh_at(token, new_expire_at, valid_after, mask, checks, Utc::now())
    }

    /// Refresh as of `now`.
    pub fn refresh_at(
        &self,
        token: &str,
        new_expire_at: DateTime<Utc>,
        valid_after: Duration,
        mask: u16,
        checks: &[Check<'_>],
        now: DateTime<Utc>,
    ) -> Result<String> {
        let claims = self.open_token(token, mask, checks)?;
        if now.signed_duration_since(claims.expire_at) > valid_after {
            tracing::debug!(id = claims.id, expire_at = %claims.expire_at, "token past refresh window");
            return Err(TokenError::Expired(claims));
        }
        self.generate(claims.id, new_expire_at, claims.addt, mask)
    }

    /// Read the masked metadata without decrypting.
    ///
    /// The value is not authenticated until the token is validated.
    pub fn inspect(&self, token: &str, mask: u16) -> Result<u16> {
        let raw = decode(token)?;
        let (addt, _) = split_outer(&raw)?;
        Ok(addt & mask)
    }

    fn open_token(&self, token: &str, mask: u16, checks: &[Check<'_>]) -> Result<Claims> {
        let raw = decode(token)?;
        let (addt, framed) = split_outer(&raw)?;
        let masked = addt & mask;

        checks::run(checks, masked).inspect_err(|e| {
            tracing::debug!(addt = masked, "token rejected by check: {e}");
        })?;

        let record = self
            .sealer
            .open(addt, framed)
            .and_then(|plaintext| Plaintext::unpack(&plaintext, &self.table))
            .inspect_err(|_| tracing::debug!("token failed authentication"))?;
        let expire_at =
            DateTime::from_timestamp_millis(record.expiry_ms).ok_or(TokenError::Invalid)?;

        Ok(Claims {
            id: record.subject,
            addt: masked,
            expire_at,
        })
    }
}

impl<E> std::fmt::Debug for Tokenizer<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer").finish_non_exhaustive()
    }
}

fn decode(token: &str) -> Result<Vec<u8>> {
    if token.len() != TOKEN_LEN {
        return Err(TokenError::Length {
            expected: TOKEN_LEN,
            actual: token.len(),
        });
    }
    Ok(URL_SAFE.decode(token)?)
}
