//! Stateless authentication tokens.
//!
//! Provides:
//! - `Tokenizer`: generate / validate / refresh under one XChaCha20-Poly1305 key
//! - Cleartext 16-bit metadata, partly caller-defined via a mask and bound
//!   to the ciphertext as associated data
//! - Pre-decryption checks over that metadata
//!
//! ## Design Decisions
//! - No server-side state. A token plus the key is everything needed to
//!   validate it; there is no revocation list.
//! - 192-bit random nonces, so generation needs no shared counter.
//! - A CRC-64 inside the sealed record backs up the Poly1305 tag.

pub mod aead;
pub mod checks;
pub mod checksum;
pub mod entropy;
pub mod layout;
pub mod tokenizer;

pub use checks::{forbid_bits, require_bits, require_value, Check, Rejection};
pub use entropy::{Entropy, OsEntropy};
pub use layout::TOKEN_LEN;
pub use tokenizer::{Claims, Tokenizer};
