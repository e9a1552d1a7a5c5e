//! `fumitok` command-line front end.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use fumitok::config::seconds;
use fumitok::token::aead::KEY_LEN;
use fumitok::{Entropy, OsEntropy, TokenError, TokenizerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fumitok")]
#[command(author, version, about = "Issue and check compact authentication tokens", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh random key as hex
    Keygen,

    /// Issue a token
    Issue {
        /// Subject id
        #[arg(long)]
        id: u64,

        /// Metadata bits (hex or decimal); only bits in the configured mask are kept
        #[arg(long, default_value = "0", value_parser = parse_u16)]
        addt: u16,

        /// Lifetime in seconds (defaults to config)
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Validate a token and print its claims
    Verify { token: String },

    /// Exchange a live or recently expired token for a new one
    Refresh {
        token: String,

        /// Lifetime of the new token in seconds (defaults to config)
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Print the masked metadata without decrypting
    Inspect { token: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Keygen = cli.command {
        let mut key = [0u8; KEY_LEN];
        OsEntropy.fill(&mut key)?;
        println!("{}", hex::encode(key));
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let tokenizer = config.build().context("failed to build tokenizer")?;
    let mask = config.metadata_mask;

    match cli.command {
        Commands::Keygen => unreachable!("handled above"),
        Commands::Issue { id, addt, ttl } => {
            let ttl = ttl.map_or_else(|| config.ttl(), seconds);
            let token = tokenizer.generate(id, expiry_after(ttl)?, addt, mask)?;
            println!("{token}");
        }
        Commands::Verify { token } => match tokenizer.validate(&token, mask, &[]) {
            Ok(claims) => {
                println!(
                    "id={} addt={:#06x} expire_at={}",
                    claims.id,
                    claims.addt,
                    claims.expire_at.to_rfc3339()
                );
            }
            Err(TokenError::Expired(claims)) => {
                println!(
                    "id={} addt={:#06x} expire_at={} expired",
                    claims.id,
                    claims.addt,
                    claims.expire_at.to_rfc3339()
                );
                anyhow::bail!("token expired");
            }
            Err(e) => return Err(e).context("token verification failed"),
        },
        Commands::Refresh { token, ttl } => {
            let ttl = ttl.map_or_else(|| config.ttl(), seconds);
            let token = tokenizer
                .refresh(&token, expiry_after(ttl)?, config.refresh_grace(), mask, &[])
                .context("token refresh failed")?;
            println!("{token}");
        }
        Commands::Inspect { token } => {
            let addt = tokenizer.inspect(&token, mask)?;
            println!("{addt:#06x}");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "fumitok=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<TokenizerConfig> {
    let config = match path {
        Some(path) => TokenizerConfig::load(path)?,
        None => match TokenizerConfig::default_path().filter(|p| p.exists()) {
            Some(path) => TokenizerConfig::load(&path)?,
            None => {
                tracing::debug!("no config file found, using defaults");
                TokenizerConfig::default()
            }
        },
    };
    Ok(config.apply_env_overrides())
}

fn expiry_after(ttl: chrono::Duration) -> Result<DateTime<Utc>> {
    Utc::now()
        .checked_add_signed(ttl)
        .context("ttl is out of range")
}

fn parse_u16(raw: &str) -> Result<u16, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| format!("invalid 16-bit value `{raw}`: {e}"))
}
