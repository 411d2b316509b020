//! Deployment record: the address book written after a registry is deployed.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use keyring_types::{Address, NetworkId};

pub const RECORD_NAME: &str = "Deployed Contracts";
pub const RECORD_VERSION: &str = "1.0.0";
/// Key the registry address is filed under in `addresses`.
pub const REGISTRY_KEY: &str = "CredentialRegistry";

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("deployment record I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("deployment record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub name: String,
    pub version: String,
    /// ISO-8601 UTC with millisecond precision, e.g. `2021-09-01T12:00:00.000Z`.
    pub timestamp: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub addresses: BTreeMap<String, Address>,
}

impl DeploymentRecord {
    pub fn new(network: NetworkId, registry: Address, deployed_at: DateTime<Utc>) -> Self {
        Self {
            name: RECORD_NAME.to_string(),
            version: RECORD_VERSION.to_string(),
            timestamp: deployed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            chain_id: network.chain_id(),
            addresses: BTreeMap::from([(REGISTRY_KEY.to_string(), registry)]),
        }
    }

    pub fn registry_address(&self) -> Option<Address> {
        self.addresses.get(REGISTRY_KEY).copied()
    }

    /// JSON with 4-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, DeploymentError> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Write the record to `path`, creating parent directories and
    /// replacing any previous record.
    pub fn write_to(&self, path: &Path) -> Result<(), DeploymentError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_pretty()?)?;
        tracing::info!(path = %path.display(), chain_id = self.chain_id, "deployment record written");
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, DeploymentError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
