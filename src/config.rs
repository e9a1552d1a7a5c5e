//! Tokenizer configuration.
//!
//! Loaded from a TOML file, with the key optionally supplied through the
//! `FUMITOK_KEY` environment variable so it never has to sit on disk.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

use crate::error::TokenError;
use crate::token::Tokenizer;

/// Environment variable overriding the configured key.
pub const KEY_ENV: &str = "FUMITOK_KEY";

/// Default token lifetime: 1 hour.
const DEFAULT_TTL_SECS: u64 = 60 * 60;

/// Default refresh grace window: 1 day.
const DEFAULT_REFRESH_GRACE_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no token key configured (set `key` or FUMITOK_KEY)")]
    MissingKey,

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Token(#[from] TokenError),
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerConfig {
    /// Hex-encoded 32-byte key.
    pub key: Option<String>,
    /// Lifetime of freshly issued tokens.
    pub ttl_secs: u64,
    /// How long after expiry a token may still be refreshed.
    pub refresh_grace_secs: u64,
    /// Caller-significant metadata bits.
    pub metadata_mask: u16,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            key: None,
            ttl_secs: DEFAULT_TTL_SECS,
            refresh_grace_secs: DEFAULT_REFRESH_GRACE_SECS,
            metadata_mask: 0,
        }
    }
}

impl std::fmt::Debug for TokenizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerConfig")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("ttl_secs", &self.ttl_secs)
            .field("refresh_grace_secs", &self.refresh_grace_secs)
            .field("metadata_mask", &format_args!("{:#06x}", self.metadata_mask))
            .finish()
    }
}

impl TokenizerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded tokenizer config");
        Ok(config)
    }

    /// Platform config location, e.g. `~/.config/fumitok/fumitok.toml`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "fumitok")
            .map(|dirs| dirs.config_dir().join("fumitok.toml"))
    }

    /// Replace the key with `key` when present.
    pub fn with_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.key = Some(key);
        }
        self
    }

    pub fn apply_env_overrides(self) -> Self {
        self.with_key_override(std::env::var(KEY_ENV).ok())
    }

    pub fn ttl(&self) -> Duration {
        seconds(self.ttl_secs)
    }

    pub fn refresh_grace(&self) -> Duration {
        seconds(self.refresh_grace_secs)
    }

    pub fn build(&self) -> Result<Tokenizer, ConfigError> {
        if self.ttl_secs == 0 {
            return Err(ConfigError::Invalid("ttl_secs must be positive".into()));
        }
        let key = self.key.as_deref().ok_or(ConfigError::MissingKey)?;
        Ok(Tokenizer::new(key)?)
    }
}

/// Whole seconds as a signed duration, saturating at [`Duration::MAX`].
pub fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KEY: &str = "0000000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn defaults_apply_to_empty_file() {
        let config = TokenizerConfig::from_toml_str("").unwrap();
        assert!(config.key.is_none());
        assert_eq!(config.ttl(), Duration::hours(1));
        assert_eq!(config.refresh_grace(), Duration::days(1));
        assert_eq!(config.metadata_mask, 0);
    }

    #[test]
    fn parses_all_fields() {
        let config = TokenizerConfig::from_toml_str(&format!(
            "key = \"{KEY}\"\nttl_secs = 60\nrefresh_grace_secs = 120\nmetadata_mask = 0x00ff\n"
        ))
        .unwrap();
        assert_eq!(config.ttl_secs, 60);
        assert_eq!(config.refresh_grace_secs, 120);
        assert_eq!(config.metadata_mask, 0x00ff);
        assert!(config.build().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            TokenizerConfig::from_toml_str("ttl = 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn oversized_mask_is_rejected() {
        assert!(TokenizerConfig::from_toml_str("metadata_mask = 70000").is_err());
    }

    #[test]
    fn missing_key_fails_build() {
        assert!(matches!(
            TokenizerConfig::default().build(),
            Err(ConfigError::MissingKey)
        ));
    }

    #[test]
    fn bad_key_surfaces_token_error() {
        let config = TokenizerConfig::default().with_key_override(Some("abcd".into()));
        assert!(matches!(
            config.build(),
            Err(ConfigError::Token(TokenError::KeySize { .. }))
        ));
    }

    #[test]
    fn zero_ttl_is_invalid() {
        let mut config = TokenizerConfig::default().with_key_override(Some(KEY.into()));
        config.ttl_secs = 0;
        assert!(matches!(config.build(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn override_ignores_blank_values() {
        let config = TokenizerConfig {
            key: Some("from-file".into()),
            ..TokenizerConfig::default()
        };
        let config = config.with_key_override(Some("  ".into()));
        assert_eq!(config.key.as_deref(), Some("from-file"));
        let config = config.with_key_override(Some(KEY.into()));
        assert_eq!(config.key.as_deref(), Some(KEY));
    }

    #[test]
    fn debug_redacts_key() {
        let config = TokenizerConfig::default().with_key_override(Some(KEY.into()));
        let shown = format!("{config:?}");
        assert!(shown.contains("<redacted>"));
        assert!(!shown.contains(KEY));
    }

    #[test]
    fn load_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fumitok.toml");
        std::fs::write(&path, format!("key = \"{KEY}\"\nttl_secs = 30\n")).unwrap();

        let config = TokenizerConfig::load(&path).unwrap();
        assert_eq!(config.ttl_secs, 30);
        assert!(config.build().is_ok());
    }

    #[test]
    fn load_missing_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.toml");
        match TokenizerConfig::load(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn huge_durations_saturate() {
        let config = TokenizerConfig {
            refresh_grace_secs: u64::MAX,
            ..TokenizerConfig::default()
        };
        assert_eq!(config.refresh_grace(), Duration::MAX);
    }
}
