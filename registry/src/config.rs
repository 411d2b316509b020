//! Registry configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use keyring_types::{Address, JobId, NetworkId, RegistryParams, TokenAmount, TypesError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid `{field}`: {source}")]
    Invalid {
        field: &'static str,
        source: TypesError,
    },
}

/// Configuration for deploying and operating a credential registry.
///
/// Can be loaded from a TOML file via [`RegistryConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Amounts are decimal strings in
/// whole payment-token units, scaled by `fee_decimals`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Network the deployment record is written for.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Fungible token verification fees are paid in.
    #[serde(default = "default_payment_token")]
    pub payment_token: Address,

    /// The only account allowed to deliver attestations.
    #[serde(default = "default_authority")]
    pub authority: Address,

    /// Off-chain job id: `0x`-prefixed 32-byte hex, or a short label.
    /// Empty means the all-zero job id.
    #[serde(default)]
    pub job_id: String,

    /// Fee per verification request, e.g. `"0.1"`.
    #[serde(default = "default_fee")]
    pub fee: String,

    /// Decimals of the payment token.
    #[serde(default = "default_fee_decimals")]
    pub fee_decimals: u32,

    /// Seconds an issued credential stays valid; 0 = forever.
    #[serde(default)]
    pub validity_window_secs: u64,

    /// Seconds before an unanswered request is rolled back; 0 = never.
    #[serde(default)]
    pub request_timeout_secs: u64,

    /// Payment tokens transferred to the registry right after deployment.
    #[serde(default = "default_initial_funding")]
    pub initial_funding: String,

    /// Data directory for credential storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Where the deployment record is written.
    #[serde(default = "default_deployments_path")]
    pub deployments_path: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Rinkeby
}

fn default_payment_token() -> Address {
    RegistryParams::RINKEBY_LINK
}

fn default_authority() -> Address {
    RegistryParams::RINKEBY_ORACLE
}

fn default_fee() -> String {
    "0.1".to_string()
}

fn default_fee_decimals() -> u32 {
    18
}

fn default_initial_funding() -> String {
    "0".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./keyring_data")
}

fn default_deployments_path() -> PathBuf {
    PathBuf::from("deployments/addresses.json")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl RegistryConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate into the immutable construction parameters.
    pub fn to_params(&self) -> Result<RegistryParams, ConfigError> {
        Ok(RegistryParams {
            payment_token: self.payment_token,
            authority: self.authority,
            job_id: self.job_id()?,
            fee: self.amount("fee", &self.fee)?,
            validity_window_secs: self.validity_window_secs,
            request_timeout_secs: self.request_timeout_secs,
        })
    }

    pub fn initial_funding_amount(&self) -> Result<TokenAmount, ConfigError> {
        self.amount("initial_funding", &self.initial_funding)
    }

    fn job_id(&self) -> Result<JobId, ConfigError> {
        let raw = self.job_id.trim();
        let parsed = if raw.starts_with("0x") {
            raw.parse()
        } else {
            JobId::from_label(raw)
        };
        parsed.map_err(|source| ConfigError::Invalid {
            field: "job_id",
            source,
        })
    }

    fn amount(&self, field: &'static str, value: &str) -> Result<TokenAmount, ConfigError> {
        TokenAmount::parse_units(value.trim(), self.fee_decimals)
            .map_err(|source| ConfigError::Invalid { field, source })
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            payment_token: default_payment_token(),
            authority: default_authority(),
            job_id: String::new(),
            fee: default_fee(),
            fee_decimals: default_fee_decimals(),
            validity_window_secs: 0,
            request_timeout_secs: 0,
            initial_funding: default_initial_funding(),
            data_dir: default_data_dir(),
            deployments_path: default_deployments_path(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
