//! Substrate Tests - account and aggregate test batch runner
//!
//! A CLI tool that exercises substrate (Polkadot) accounts end to end:
//! key generation and import, aggregate publishing against an aggregation
//! API, and message encryption.
//!
//! ## Features
//!
//! - Sequential test batches that keep going past failures
//! - sr25519 accounts from mnemonics or raw mini-secrets
//! - Live aggregation API or an in-memory message store
//! - Multiple output formats (Table, JSON, Summary)
//!
//! ## Usage
//!
//! ```bash
//! # Run the substrate batch against the default API server
//! substrate-tests run
//!
//! # Run tests 1 and 4 without touching the network
//! substrate-tests run --offline --test 1 --test 4
//!
//! # List available tests
//! substrate-tests list --detailed
//!
//! # Generate an account
//! substrate-tests account new --ss58-prefix 0
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

mod accounts;
mod cli;
mod config;
mod executor;
mod http;
mod messages;
mod models;
mod output;
mod tests;
mod utils;

use accounts::{Account, SubstrateAccount};
use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig};
use executor::BatchRunner;
use messages::{HttpApi, MemoryApi, MessageApi};
use output::{OutputFormat, ResultFormatter};
use tests::TestContext;
use utils::LogLevel;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        args.log_level
            .as_deref()
            .or(env.log_level.as_deref())
            .and_then(LogLevel::from_str)
            .unwrap_or(LogLevel::Info)
    };
    utils::init_logger(level);

    let config = load_config(args.config.as_deref(), &env)?;

    match args.command {
        cli::Command::Run(run_args) => run_batch(run_args, config, &env).await,
        cli::Command::List(list_args) => {
            list_batches(list_args, &config);
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Account(account_args) => {
            manage_account(account_args, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, &config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolve the config file, then layer environment overrides on top
fn load_config(path: Option<&str>, env: &EnvConfig) -> Result<AppConfig> {
    let file = match path.or(env.config_file.as_deref()) {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };

    let mut config = file.app;
    config.apply_env(env)?;
    Ok(config)
}

async fn run_batch(args: cli::RunArgs, config: AppConfig, env: &EnvConfig) -> Result<ExitCode> {
    let config = args.apply_to(config)?;
    let format = OutputFormat::from_str(&config.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", config.format))?;

    let api: Arc<dyn MessageApi> = if args.offline || env.offline.unwrap_or(false) {
        Arc::new(MemoryApi::new())
    } else {
        Arc::new(HttpApi::new(&config.api_server, config.timeout_secs)?)
    };

    info!("Running batch '{}' against {}", args.batch, api.server());
    debug!("Configuration: {:?}", config);

    let context = TestContext::from_config(api, &config);
    let batch = tests::batch_by_name(&args.batch, context)
        .ok_or_else(|| anyhow::anyhow!("Unknown batch: {}", args.batch))?;

    let runner = BatchRunner::new();
    let result = if args.test.is_empty() {
        runner.run(&batch).await
    } else {
        runner.run_selected(&batch, &args.test).await?
    };

    println!("{}", ResultFormatter::new(format).format_batch(&result));

    if let Some(path) = args.output {
        output::write_result_to_file(&path, &result)?;
        info!("Results saved to {}", path);
    }

    Ok(if result.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn list_batches(args: cli::ListArgs, config: &AppConfig) {
    let context = TestContext::from_config(Arc::new(MemoryApi::new()), config);

    for name in tests::BATCHES {
        let Some(batch) = tests::batch_by_name(name, context.clone()) else {
            continue;
        };

        println!("\n{} batch ({} tests)", batch.name(), batch.len());
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for (i, case) in batch.cases().iter().enumerate() {
            match case.description().filter(|_| args.detailed) {
                Some(description) => println!("  {:2}. {:32} {}", i + 1, case.name(), description),
                None => println!("  {:2}. {}", i + 1, case.name()),
            }
        }
    }
    println!();
}

fn manage_account(args: cli::AccountArgs, config: &AppConfig) -> Result<()> {
    let prefix = args.ss58_prefix.unwrap_or(config.ss58_prefix);

    let (account, mnemonic) = match args.action {
        cli::AccountAction::New => {
            let (account, mnemonic) = accounts::new_account()?;
            (account, Some(mnemonic))
        }
        cli::AccountAction::FromMnemonic { phrase } => {
            (accounts::import_account_from_mnemonic(&phrase)?, None)
        }
        cli::AccountAction::FromKey { key } => {
            (accounts::import_account_from_private_key(&key)?, None)
        }
    };

    let account = account
        .with_ss58_prefix(prefix)
        .with_context(|| format!("Cannot encode address with SS58 prefix {prefix}"))?;
    print_account(&account, mnemonic.as_deref());
    Ok(())
}

fn print_account(account: &SubstrateAccount, mnemonic: Option<&str>) {
    println!("Chain:       {}", account.chain());
    println!("Address:     {}", account.address());
    println!("SS58 prefix: {}", account.ss58_prefix());
    println!("Public key:  0x{}", hex::encode(account.public_key()));
    if let Some(mnemonic) = mnemonic {
        println!("Mnemonic:    {mnemonic}");
    }
}

fn manage_config(args: cli::ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            ConfigFile::default().save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { format } => {
            let file = ConfigFile {
                app: config.clone(),
                ..Default::default()
            };
            let output = if format == "json" {
                serde_json::to_string_pretty(&file)?
            } else {
                serde_yaml::to_string(&file)?
            };
            println!("{output}");
        }

        cli::ConfigAction::Env => {
            let env = EnvConfig::load();
            if env.has_any() {
                env.print_summary();
                println!();
            }
            config::print_env_help();
        }
    }

    Ok(())
}

