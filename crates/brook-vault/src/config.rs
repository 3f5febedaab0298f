//! Vault configuration.
//!
//! [`VaultConfig`] is loaded with the `config` crate: an optional file
//! (format inferred from its extension) layered under environment variables
//! prefixed with `BROOK_`, e.g. `BROOK_RATE_PER_SECOND=1585489599`.

use std::path::Path;

use brook_accrual::rate_per_second_from_apr_bps;
use brook_core::constants::ENV_PREFIX;
use serde::Deserialize;
use thiserror::Error;

use crate::telemetry;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)] Load(#[from] config::ConfigError),
    #[error("missing required setting: {0}")] Missing(&'static str),
    #[error("rate_per_second and apr_bps are mutually exclusive")] ConflictingRate,
    #[error("unknown log_format {0:?}, expected \"text\" or \"json\"")] UnknownLogFormat(String),
    #[error("asset mismatch: configured {configured}, ledger is {actual}")] AssetMismatch { configured: String, actual: String },
}

/// Deployment parameters for a vault.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Identifier of the managed asset. Must match the asset ledger handed to the vault.
    pub asset_id: String,
    /// Initial owner.
    pub owner: String,
    /// The vault's own account on the asset ledger.
    pub vault_account: String,
    /// Growth coefficient per second, fixed-point with `SCALE` denominator.
    pub rate_per_second: Option<u64>,
    /// Alternative to `rate_per_second`: annual rate in basis points.
    pub apr_bps: Option<u32>,
    /// Deploy with deposits and withdrawals paused.
    pub start_paused: bool,
    /// Log level filter string (e.g. "info", "debug", "brook_vault=trace").
    pub log_level: String,
    /// "json" for structured output or "text" for human-readable lines.
    pub log_format: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            asset_id: String::new(),
            owner: String::new(),
            vault_account: String::new(),
            rate_per_second: None,
            apr_bps: None,
            start_paused: false,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl VaultConfig {
    /// Load from `path` (if given) and `BROOK_*` environment variables, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.asset_id.is_empty() {
            return Err(ConfigError::Missing("asset_id"));
        }
        if self.owner.is_empty() {
            return Err(ConfigError::Missing("owner"));
        }
        if self.vault_account.is_empty() {
            return Err(ConfigError::Missing("vault_account"));
        }
        if self.rate_per_second.is_some() && self.apr_bps.is_some() {
            return Err(ConfigError::ConflictingRate);
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(ConfigError::UnknownLogFormat(self.log_format.clone()));
        }
        Ok(())
    }

    /// Install the global subscriber from `log_level` and `log_format`.
    /// Returns `false` if one was already installed.
    pub fn init_logging(&self) -> bool {
        telemetry::init_logging(&self.log_level, &self.log_format)
    }

    /// The configured per-second rate; zero when neither form is set.
    pub fn resolved_rate_per_second(&self) -> Result<u128, ConfigError> {
        match (self.rate_per_second, self.apr_bps) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingRate),
            (Some(rate), None) => Ok(rate as u128),
            (None, Some(bps)) => Ok(rate_per_second_from_apr_bps(bps)),
            (None, None) => Ok(0),
        }
    }
}
