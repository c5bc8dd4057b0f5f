//! Configuration module
//!
//! Handles loading and managing configuration. Values are layered:
//! defaults, then the config file, then `SUBSTRATE_TESTS_*` environment
//! variables, then command-line flags.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::accounts::ss58;
use crate::messages::{ItemType, DEFAULT_API_SERVER};
use crate::output::OutputFormat;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Aggregation API server
    pub api_server: String,

    /// Channel messages are published on
    pub channel: String,

    /// Storage engine for content that does not go inline
    pub storage_engine: ItemType,

    /// Ask for content to travel inside the message
    pub inline_requested: bool,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// SS58 network prefix used when displaying addresses
    pub ss58_prefix: u16,

    /// Output format for batch results
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_server: DEFAULT_API_SERVER.to_string(),
            channel: "TEST".to_string(),
            storage_engine: ItemType::Ipfs,
            inline_requested: true,
            timeout_secs: 30,
            ss58_prefix: ss58::DEFAULT_PREFIX,
            format: "table".to_string(),
        }
    }
}

impl AppConfig {
    /// Apply environment overrides
    pub fn apply_env(&mut self, env: &EnvConfig) -> Result<()> {
        if let Some(server) = &env.api_server {
            self.api_server = server.clone();
        }
        if let Some(channel) = &env.channel {
            self.channel = channel.clone();
        }
        if let Some(engine) = &env.storage_engine {
            self.storage_engine = parse_storage_engine(engine)?;
        }
        if let Some(timeout) = env.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        Ok(())
    }

    /// Check the settings a run depends on
    pub fn validate(&self) -> Result<()> {
        if !(self.api_server.starts_with("http://") || self.api_server.starts_with("https://")) {
            bail!(
                "API server must be an http(s) URL, got '{}'",
                self.api_server
            );
        }
        if self.channel.trim().is_empty() {
            bail!("Channel must not be empty");
        }
        if !self.storage_engine.is_storage_engine() {
            bail!("{} is not a storage engine", self.storage_engine);
        }
        if self.ss58_prefix > 63 {
            bail!(
                "SS58 prefix {} is not a simple prefix (0-63)",
                self.ss58_prefix
            );
        }
        if self.timeout_secs == 0 {
            bail!("Timeout must be at least one second");
        }
        if OutputFormat::from_str(&self.format).is_none() {
            bail!("Unknown output format: {}", self.format);
        }
        Ok(())
    }
}

/// Parse a storage engine name; `inline` is not an engine
pub fn parse_storage_engine(name: &str) -> Result<ItemType> {
    match ItemType::from_str(name) {
        Some(engine) if engine.is_storage_engine() => Ok(engine),
        _ => bail!("Unknown storage engine: {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_server, "https://api2.aleph.im");
        assert_eq!(config.channel, "TEST");
        assert_eq!(config.storage_engine, ItemType::Ipfs);
        assert!(config.inline_requested);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.ss58_prefix, 42);
    }

    #[test]
    fn test_apply_env() {
        let mut config = AppConfig::default();
        let env = EnvConfig {
            api_server: Some("http://localhost:4024".to_string()),
            storage_engine: Some("storage".to_string()),
            timeout: Some(5),
            ..Default::default()
        };

        config.apply_env(&env).unwrap();
        assert_eq!(config.api_server, "http://localhost:4024");
        assert_eq!(config.storage_engine, ItemType::Storage);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.channel, "TEST");
    }

    #[test]
    fn test_apply_env_rejects_bad_storage_engine() {
        for engine in ["inline", "floppy"] {
            let env = EnvConfig {
                storage_engine: Some(engine.to_string()),
                ..Default::default()
            };
            assert!(AppConfig::default().apply_env(&env).is_err());
        }
    }

    #[test]
    fn test_validate_layered_values() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.apply_env(&EnvConfig {
            timeout: Some(0),
            ..Default::default()
        })
        .unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig {
            api_server: "localhost:4024".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            storage_engine: ItemType::Inline,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            format: "csv".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("channel: MINE\n").unwrap();
        assert_eq!(config.channel, "MINE");
        assert_eq!(config.api_server, DEFAULT_API_SERVER);
    }
}
