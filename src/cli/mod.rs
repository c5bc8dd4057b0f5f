//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{parse_storage_engine, AppConfig};

/// Substrate account test batch runner
#[derive(Parser, Debug)]
#[command(name = "substrate-tests")]
#[command(version = "0.1.0")]
#[command(about = "Run the substrate account test batch against an aggregation API")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a test batch
    Run(RunArgs),

    /// List available batches and tests
    List(ListArgs),

    /// Create or import substrate accounts
    Account(AccountArgs),

    /// Show or create configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Batch to run
    #[arg(short, long, default_value = "substrate")]
    pub batch: String,

    /// Specific test number to run (repeatable)
    #[arg(short, long)]
    pub test: Vec<usize>,

    /// Aggregation API server URL
    #[arg(long)]
    pub api_server: Option<String>,

    /// Channel for published messages
    #[arg(long)]
    pub channel: Option<String>,

    /// Storage engine for non-inline content (storage, ipfs)
    #[arg(long)]
    pub storage_engine: Option<String>,

    /// Always send content through the storage engine
    #[arg(long)]
    pub no_inline: bool,

    /// Use the in-memory message store instead of the API server
    #[arg(long)]
    pub offline: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Save the batch result as JSON
    #[arg(short, long)]
    pub output: Option<String>,
}

impl RunArgs {
    /// Layer run flags over the loaded configuration and check the result
    pub fn apply_to(&self, mut config: AppConfig) -> Result<AppConfig> {
        if let Some(server) = &self.api_server {
            config.api_server = server.clone();
        }
        if let Some(channel) = &self.channel {
            config.channel = channel.clone();
        }
        if let Some(engine) = &self.storage_engine {
            config.storage_engine = parse_storage_engine(engine)?;
        }
        if self.no_inline {
            config.inline_requested = false;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(format) = &self.format {
            config.format = format.clone();
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show test descriptions
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for account command
#[derive(Parser, Debug)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub action: AccountAction,

    /// SS58 network prefix for the printed address
    #[arg(long, global = true)]
    pub ss58_prefix: Option<u16>,
}

#[derive(Subcommand, Debug)]
pub enum AccountAction {
    /// Generate a new account and its mnemonic
    New,

    /// Import an account from a mnemonic phrase
    FromMnemonic {
        /// Mnemonic phrase (quote it)
        phrase: String,
    },

    /// Import an account from a hex mini-secret
    FromKey {
        /// 32-byte secret, hex with optional 0x prefix
        key: String,
    },
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Write a default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "substrate-tests.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show supported environment variables
    Env,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::ItemType;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["substrate-tests", "list", "--detailed"]);
        match args.command {
            Command::List(list_args) => {
                assert!(list_args.detailed);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "substrate-tests",
            "run",
            "--test",
            "1",
            "--test",
            "3",
            "--offline",
            "--api-server",
            "http://localhost:4024",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        match args.command {
            Command::Run(run_args) => {
                assert_eq!(run_args.batch, "substrate");
                assert_eq!(run_args.test, vec![1, 3]);
                assert!(run_args.offline);
                assert!(!run_args.no_inline);
                assert_eq!(run_args.api_server.as_deref(), Some("http://localhost:4024"));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_account_args() {
        let args = Args::parse_from([
            "substrate-tests",
            "account",
            "from-key",
            "0x00",
            "--ss58-prefix",
            "0",
        ]);
        match args.command {
            Command::Account(account_args) => {
                assert_eq!(account_args.ss58_prefix, Some(0));
                assert!(matches!(account_args.action, AccountAction::FromKey { ref key } if key == "0x00"));
            }
            _ => panic!("Expected Account command"),
        }
    }

    #[test]
    fn test_config_init_defaults() {
        let args = Args::parse_from(["substrate-tests", "config", "init"]);
        match args.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { output, force },
            }) => {
                assert_eq!(output, "substrate-tests.yaml");
                assert!(!force);
            }
            _ => panic!("Expected Config init command"),
        }
    }

    fn run_args(flags: &[&str]) -> RunArgs {
        let argv = ["substrate-tests", "run"].into_iter().chain(flags.iter().copied());
        match Args::parse_from(argv).command {
            Command::Run(args) => args,
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_flags_override_config() {
        let args = run_args(&[
            "--api-server",
            "http://localhost:4024",
            "--storage-engine",
            "storage",
            "--no-inline",
            "--format",
            "json",
        ]);
        let config = args.apply_to(AppConfig::default()).unwrap();

        assert_eq!(config.api_server, "http://localhost:4024");
        assert_eq!(config.storage_engine, ItemType::Storage);
        assert!(!config.inline_requested);
        assert_eq!(config.format, "json");
    }

    #[test]
    fn test_run_flags_are_validated() {
        for flags in [
            ["--timeout", "0"],
            ["--api-server", "ftp://example.com"],
            ["--storage-engine", "inline"],
            ["--format", "csv"],
        ] {
            assert!(
                run_args(&flags).apply_to(AppConfig::default()).is_err(),
                "{flags:?} accepted"
            );
        }
    }

    #[test]
    fn test_layered_config_is_validated() {
        let config = AppConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(run_args(&[]).apply_to(config).is_err());
    }
}
