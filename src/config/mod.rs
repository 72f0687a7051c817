//! Configuration for Roundtrip
//!
//! Layered settings: optional TOML file, `ROUNDTRIP_*` environment
//! overrides, and the conventional `SOLANA_URL` variable (from the
//! environment or a `.env` file) taking precedence for the RPC endpoint.

use std::env;
use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default RPC endpoint when nothing is configured
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RPC endpoint of the node to talk to
    pub rpc_url: String,
    /// Commitment level: "processed", "confirmed" or "finalized"
    pub commitment: String,
    /// Round budget for confirmation waits
    pub confirmation_rounds: u64,
    /// Pacing of the round-wait slot poll in milliseconds
    pub round_poll_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: "confirmed".to_string(),
            confirmation_rounds: crate::DEFAULT_CONFIRMATION_ROUNDS,
            round_poll_ms: crate::DEFAULT_ROUND_POLL_MS,
        }
    }
}

impl Settings {
    /// Load settings from the default sources: `roundtrip.toml` in the
    /// working directory (if present), then `ROUNDTRIP_*` environment
    /// variables, then `SOLANA_URL`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None::<&Path>)
    }

    /// Load settings with an explicit file path instead of the default one
    pub fn load_from(path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        // Load .env first so SOLANA_URL and ROUNDTRIP_* land in the process
        // environment (silently skipped if absent)
        dotenv::dotenv().ok();

        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(File::from(path.as_ref())),
            None => builder.add_source(File::with_name("roundtrip").required(false)),
        };
        builder = builder.add_source(Environment::with_prefix("ROUNDTRIP").try_parsing(true));

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Ok(url) = env::var("SOLANA_URL") {
            if !url.is_empty() {
                settings.rpc_url = url;
            }
        }

        Ok(settings)
    }

    /// Commitment level as the SDK type; unknown values fall back to
    /// confirmed with a warning
    pub fn commitment(&self) -> solana_sdk::commitment_config::CommitmentConfig {
        use solana_sdk::commitment_config::CommitmentConfig;

        match self.commitment.as_str() {
            "processed" => CommitmentConfig::processed(),
            "confirmed" => CommitmentConfig::confirmed(),
            "finalized" => CommitmentConfig::finalized(),
            other => {
                tracing::warn!("Unknown commitment '{}', using confirmed", other);
                CommitmentConfig::confirmed()
            }
        }
    }
}

/// Error types for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration load failed: {0}")]
    Load(#[from] config::ConfigError),
}
