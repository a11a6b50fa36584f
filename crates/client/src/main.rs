//! `packs`: inspect the pack contract from the terminal.
//!
//! Reads go straight to a TronGrid node. Nothing here signs or broadcasts.
//!
//! ```bash
//! # Account overview on Shasta
//! PACKS_CONTRACT_ADDRESS=T... packs status TXYZ...
//!
//! # Receipt of a transaction, as JSON
//! packs --json tx 3f4c...
//! ```

mod commands;

use anyhow::Result;
use clap::Parser;
use client_blockchain_tron::{TronConfig, TronNetwork};
use client_core::AppConfig;
use packs_client::{Client, logging};

use commands::Command;

/// Inspect the stake / pack / NFT contract
#[derive(Parser)]
#[command(name = "packs")]
#[command(about = "Read-only client for the TRON pack contract", long_about = None)]
#[command(version)]
struct Cli {
    /// Contract address (base58 or hex)
    #[arg(long, env = "PACKS_CONTRACT_ADDRESS", global = true)]
    contract: Option<String>,

    /// TRON network
    #[arg(long, env = "TRON_NETWORK", default_value = "shasta", global = true)]
    network: TronNetwork,

    /// Full-node URL (defaults to the network's TronGrid endpoint)
    #[arg(long, env = "TRON_RPC_URL", global = true)]
    rpc_url: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to the cache directory
    #[arg(long, env = "PACKS_LOG_FILE", global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file if it exists
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // 2. Setup logging
    let _guard = logging::setup_logging(cli.verbose, cli.log_file)?;

    // 3. Load configuration
    let contract = cli.contract.clone().unwrap_or_default();
    let config = AppConfig::new(contract.trim()).with_env_overrides()?;

    // Offline commands need neither a contract nor a node
    if let Command::Preview(cmd) = &cli.command {
        return cmd.execute(&config.economics, cli.json);
    }

    if config.contract.address.is_empty() {
        anyhow::bail!("Contract address is required (--contract or PACKS_CONTRACT_ADDRESS)");
    }

    let mut tron = TronConfig::from_env().map_err(anyhow::Error::msg)?;
    tron.network = cli.network;
    if let Some(url) = cli.rpc_url {
        tron = tron.with_rpc_url(url);
    }

    tracing::debug!(
        "Network: {} ({}), contract: {}",
        tron.network,
        tron.get_rpc_url(),
        config.contract.address
    );

    // 4. Bind and run
    let client = Client::builder().config(config).tron(tron).build().await?;

    cli.command.execute(&client, cli.json).await
}
