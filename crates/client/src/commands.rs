//! Subcommands of the `packs` binary.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use client_blockchain_core::TransactionStatus;
use client_core::TrxAmount;
use client_core::config::EconomicsConfig;
use packs_client::Client;
use serde::Serialize;

#[derive(Subcommand)]
pub enum Command {
    /// Stake, credits, packs, NFTs and catalog of an account
    Status(Status),

    /// Bandwidth credits of an account
    Credits(Credits),

    /// Purchasable packs
    Catalog,

    /// Details of one pack
    Pack(Pack),

    /// Details of one NFT
    Nft(Nft),

    /// Receipt status of a transaction
    Tx(Tx),

    /// Check that the node answers
    Health,

    /// Credits a stake would earn (offline)
    Preview(Preview),
}

impl Command {
    pub async fn execute(&self, client: &Client, json: bool) -> Result<()> {
        match self {
            Command::Status(cmd) => cmd.execute(client, json).await,
            Command::Credits(cmd) => cmd.execute(client, json).await,
            Command::Catalog => catalog(client, json).await,
            Command::Pack(cmd) => cmd.execute(client, json).await,
            Command::Nft(cmd) => cmd.execute(client, json).await,
            Command::Tx(cmd) => cmd.execute(client, json).await,
            Command::Health => health(client, json).await,
            Command::Preview(cmd) => cmd.execute(&client.config().economics, json),
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_timestamp(secs: u128) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn parse_id(raw: &str) -> Result<u128> {
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid id: {}", raw))
}

#[derive(Args)]
pub struct Status {
    /// Account address
    address: String,
}

impl Status {
    async fn execute(&self, client: &Client, json: bool) -> Result<()> {
        let snapshot = client.status(&self.address).await?;
        if json {
            return print_json(&snapshot);
        }

        let mint_cost = client.config().economics.mint_cost;

        println!("Account:   {}", self.address);
        println!("Staked:    {} TRX", snapshot.staked_amount);
        if snapshot.stake_timestamp > 0 {
            println!("Since:     {}", format_timestamp(snapshot.stake_timestamp));
        }
        println!(
            "Credits:   {} ({})",
            snapshot.bandwidth_credits,
            if snapshot.can_mint(mint_cost) {
                "can mint"
            } else {
                "not enough to mint"
            }
        );

        println!("\nPacks ({}):", snapshot.packs.len());
        for (index, pack) in snapshot.packs.iter().enumerate() {
            println!("  [{}] pack #{} ({} TRX)", index, pack.id, pack.price);
        }

        println!("\nNFTs ({}):", snapshot.nfts.len());
        for nft in &snapshot.nfts {
            println!(
                "  #{} from pack #{}, minted {}",
                nft.id,
                nft.pack_id,
                nft.minted_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }

        println!("\nCatalog:");
        for pack in &snapshot.catalog {
            println!("  pack #{}: {} TRX", pack.id, pack.price);
        }

        Ok(())
    }
}

#[derive(Args)]
pub struct Credits {
    /// Account address
    address: String,
}

impl Credits {
    async fn execute(&self, client: &Client, json: bool) -> Result<()> {
        let credits = client.bandwidth_credits(&self.address).await?;
        if json {
            return print_json(&serde_json::json!({
                "address": self.address,
                "bandwidth_credits": credits.to_string(),
            }));
        }
        println!("{}", credits);
        Ok(())
    }
}

async fn catalog(client: &Client, json: bool) -> Result<()> {
    let packs = client.catalog().await?;
    if json {
        return print_json(&packs);
    }

    if packs.is_empty() {
        println!("No packs available");
    }
    for pack in &packs {
        println!("pack #{}: {} TRX", pack.id, pack.price);
    }
    Ok(())
}

#[derive(Args)]
pub struct Pack {
    /// Pack id
    id: String,
}

impl Pack {
    async fn execute(&self, client: &Client, json: bool) -> Result<()> {
        let details = client.pack(parse_id(&self.id)?).await?;
        if json {
            return print_json(&details);
        }

        if !details.exists {
            println!("Pack #{} does not exist", self.id.trim());
            return Ok(());
        }
        let price = TrxAmount::try_from_sun(details.price_sun)?;
        println!("pack #{}: {} TRX", details.id, price);
        Ok(())
    }
}

#[derive(Args)]
pub struct Nft {
    /// NFT id
    id: String,
}

impl Nft {
    async fn execute(&self, client: &Client, json: bool) -> Result<()> {
        let details = client.nft(parse_id(&self.id)?).await?;
        if json {
            return print_json(&details);
        }

        if details.id == 0 {
            println!("NFT #{} does not exist", self.id.trim());
            return Ok(());
        }
        println!("NFT #{}", details.id);
        println!("  pack:   #{}", details.pack_id);
        println!("  owner:  {}", details.owner);
        println!("  minted: {}", format_timestamp(details.minted_at));
        Ok(())
    }
}

#[derive(Args)]
pub struct Tx {
    /// Transaction hash (64 hex characters)
    hash: String,
}

impl Tx {
    async fn execute(&self, client: &Client, json: bool) -> Result<()> {
        let status = client.transaction(&self.hash).await?;
        let explorer = client.explorer_url(self.hash.trim().trim_start_matches("0x"));

        if json {
            return print_json(&serde_json::json!({
                "status": status,
                "explorer": explorer,
            }));
        }

        match &status {
            TransactionStatus::Pending => println!("Pending (or unknown to the node)"),
            TransactionStatus::Confirmed { block_height } => {
                println!("Confirmed in block {}", block_height)
            }
            TransactionStatus::Failed { error } => println!("Failed: {}", error),
        }
        if let Some(url) = explorer {
            println!("{}", url);
        }
        Ok(())
    }
}

async fn health(client: &Client, json: bool) -> Result<()> {
    client.health().await?;
    if json {
        return print_json(&serde_json::json!({
            "network": client.tron().network.to_string(),
            "rpc_url": client.tron().get_rpc_url(),
            "contract": client.contract().address().to_string(),
            "healthy": true,
        }));
    }
    println!(
        "{} is up ({}), contract {}",
        client.tron().get_rpc_url(),
        client.tron().network,
        client.contract().address()
    );
    Ok(())
}

#[derive(Args)]
pub struct Preview {
    /// Stake amount in TRX
    amount: String,
}

impl Preview {
    pub fn execute(&self, economics: &EconomicsConfig, json: bool) -> Result<()> {
        let amount = TrxAmount::parse_positive(&self.amount)?;
        let credits = economics.credits_preview(amount);
        let mints = credits / economics.mint_cost.max(1);

        if json {
            return print_json(&serde_json::json!({
                "amount": amount,
                "credits": credits.to_string(),
                "mints": mints.to_string(),
            }));
        }
        println!(
            "Staking {} TRX earns about {} credits ({} mint(s) at {} each)",
            amount, credits, mints, economics.mint_cost
        );
        Ok(())
    }
}
