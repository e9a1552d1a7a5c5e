//! Compact, self-contained authentication tokens.
//!
//! A token binds a 64-bit subject id and an expiry under XChaCha20-Poly1305
//! and carries 16 bits of cleartext, integrity-bound metadata that callers
//! can filter on before paying for decryption.
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use fumitok::Tokenizer;
//!
//! # fn main() -> fumitok::Result<()> {
//! let tk = Tokenizer::new(&"00".repeat(32))?;
//! let token = tk.generate(42, Utc::now() + Duration::hours(1), 0x0001, 0x00ff)?;
//! let claims = tk.validate(&token, 0x00ff, &[])?;
//! assert_eq!(claims.id, 42);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod token;

pub use config::{ConfigError, TokenizerConfig};
pub use error::{Result, TokenError};
pub use token::{Check, Claims, Entropy, OsEntropy, Rejection, Tokenizer, TOKEN_LEN};
