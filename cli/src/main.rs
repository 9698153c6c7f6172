// ethcompat/cli/src/main.rs

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use commands::inspect::{self, InspectCommands};
use config::{Config, Network, CHAIN_ID_ENV};
use logging::{init_logging, LogLevel};

#[derive(Parser)]
#[command(name = "ethcompat")]
#[command(about = "Inspect and convert raw Ethereum transactions into native signed messages")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Network preset
    #[arg(long, value_enum, global = true)]
    network: Option<Network>,

    /// Chain ID (overrides --network and the config file)
    #[arg(long, global = true)]
    chain_id: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: InspectCommands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_chain_id = std::env::var(CHAIN_ID_ENV).ok();
    let mut config = Config::load(
        cli.config.as_deref(),
        env_chain_id.as_deref(),
        cli.network,
        cli.chain_id,
    )?;
    if let Some(level) = &cli.log_level {
        config.log.level = LogLevel::parse(level);
    }

    let log_config = config.log.clone().with_env();
    init_logging(&log_config)?;

    tracing::debug!(
        chain_id = config.decoder.chain_id,
        max_transaction_size = config.decoder.max_transaction_size,
        "Loaded configuration"
    );

    inspect::execute(cli.command, &config)
}
