//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "SUBSTRATE_TESTS";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// API server from SUBSTRATE_TESTS_API_SERVER
    pub api_server: Option<String>,
    /// Channel from SUBSTRATE_TESTS_CHANNEL
    pub channel: Option<String>,
    /// Storage engine from SUBSTRATE_TESTS_STORAGE_ENGINE
    pub storage_engine: Option<String>,
    /// Timeout from SUBSTRATE_TESTS_TIMEOUT
    pub timeout: Option<u64>,
    /// Config file from SUBSTRATE_TESTS_CONFIG
    pub config_file: Option<String>,
    /// Output format from SUBSTRATE_TESTS_FORMAT
    pub format: Option<String>,
    /// Offline mode from SUBSTRATE_TESTS_OFFLINE
    pub offline: Option<bool>,
    /// Log level from SUBSTRATE_TESTS_LOG_LEVEL
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            api_server: get_env("API_SERVER"),
            channel: get_env("CHANNEL"),
            storage_engine: get_env("STORAGE_ENGINE"),
            timeout: get_env_parse("TIMEOUT"),
            config_file: get_env("CONFIG"),
            format: get_env("FORMAT"),
            offline: get_env_bool("OFFLINE"),
            log_level: get_env("LOG_LEVEL"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.api_server.is_some()
            || self.channel.is_some()
            || self.storage_engine.is_some()
            || self.timeout.is_some()
            || self.config_file.is_some()
            || self.format.is_some()
            || self.offline.is_some()
            || self.log_level.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_API_SERVER:     {:?}", ENV_PREFIX, self.api_server);
        println!("  {}_CHANNEL:        {:?}", ENV_PREFIX, self.channel);
        println!("  {}_STORAGE_ENGINE: {:?}", ENV_PREFIX, self.storage_engine);
        println!("  {}_TIMEOUT:        {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_CONFIG:         {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_FORMAT:         {:?}", ENV_PREFIX, self.format);
        println!("  {}_OFFLINE:        {:?}", ENV_PREFIX, self.offline);
        println!("  {}_LOG_LEVEL:      {:?}", ENV_PREFIX, self.log_level);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all SUBSTRATE_TESTS environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_API_SERVER      Aggregation API server URL");
    println!("  {ENV_PREFIX}_CHANNEL         Channel for published messages");
    println!("  {ENV_PREFIX}_STORAGE_ENGINE  Storage engine (storage, ipfs)");
    println!("  {ENV_PREFIX}_TIMEOUT         Request timeout in seconds");
    println!("  {ENV_PREFIX}_CONFIG          Path to configuration file");
    println!("  {ENV_PREFIX}_FORMAT          Output format (table, json, json-pretty, summary)");
    println!("  {ENV_PREFIX}_OFFLINE         Use the in-memory message store (true/false)");
    println!("  {ENV_PREFIX}_LOG_LEVEL       Log level (trace, debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_API_SERVER=http://localhost:4024");
    println!("  substrate-tests run");
}
