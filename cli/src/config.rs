//! Runner configuration with TOML file support.

use nomvote_types::{Address, Network};
use nomvote_utils::LogFormat;
use nomvote_voting::{RegistryConfig, VotingParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::CliError;

/// First account of the standard local development mnemonic.
pub const DEV_OWNER: Address = Address::new([
    0xf3, 0x9f, 0xd6, 0xe5, 0x1a, 0xad, 0x88, 0xf6, 0xf4, 0xce, 0x6a, 0xb8, 0x82, 0x72, 0x79,
    0xcf, 0xff, 0xb9, 0x22, 0x66,
]);

/// Configuration for a task run.
///
/// Can be loaded from a TOML file via [`CliConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). Command-line flags override file values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Which network the registry runs against.
    #[serde(default = "default_network")]
    pub network: Network,

    /// Registry owner; also the caller of tasks that name no `from`.
    #[serde(default = "default_owner")]
    pub owner: Address,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Fee, window and payout shares.
    #[serde(default)]
    pub params: VotingParams,
}

fn default_network() -> Network {
    Network::Local
}

fn default_owner() -> Address {
    DEV_OWNER
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        toml::from_str(s).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            owner: self.owner,
            params: self.params.clone(),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            owner: default_owner(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: VotingParams::default(),
        }
    }
}
