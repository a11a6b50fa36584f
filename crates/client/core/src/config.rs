//! Client configuration and loaders.
use std::env;
use std::fs;
use std::time::Duration;

use crate::amount::{SUN_PER_TRX, TrxAmount};
use crate::error::{ClientError, Result};

/// Contract ABI shipped with the client.
pub const BUNDLED_ABI: &str = include_str!("../abi/pack_nft.json");

/// Configuration required to bind the contract and drive actions.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub contract: ContractConfig,
    pub network: NetworkConfig,
    pub economics: EconomicsConfig,
    pub sync: SyncConfig,
    pub tx: TxConfig,
}

impl AppConfig {
    pub fn new(contract_address: impl Into<String>) -> Self {
        Self {
            contract: ContractConfig {
                address: contract_address.into(),
                abi: BUNDLED_ABI.to_string(),
            },
            network: NetworkConfig::default(),
            economics: EconomicsConfig::default(),
            sync: SyncConfig::default(),
            tx: TxConfig::default(),
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// - `PACKS_CONTRACT_ADDRESS` (required)
    /// - `PACKS_CONTRACT_ABI`: path to an ABI JSON file
    /// - `TRON_NETWORK`: network identifier the wallet must be on
    /// - `PACKS_MINT_COST` / `PACKS_CREDITS_PER_TRX`
    /// - `PACKS_CATALOG_IDS`: comma-separated pack ids
    /// - `PACKS_SETTLE_DELAY_MS`
    /// - `PACKS_FEE_LIMIT`: in sun
    pub fn from_env() -> Result<Self> {
        let address = env::var("PACKS_CONTRACT_ADDRESS")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ClientError::Config("PACKS_CONTRACT_ADDRESS is not set".into()))?;

        Self::new(address.trim()).with_env_overrides()
    }

    /// Apply the optional variables read by [`from_env`](Self::from_env).
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(path) = env::var("PACKS_CONTRACT_ABI") {
            self.contract.abi = fs::read_to_string(&path).map_err(|e| {
                ClientError::Config(format!("failed to read contract ABI {}: {}", path, e))
            })?;
        }

        if let Ok(network) = env::var("TRON_NETWORK") {
            self.network.identifier = network.trim().to_lowercase();
        }

        if let Some(cost) = read_env::<u128>("PACKS_MINT_COST") {
            self.economics.mint_cost = cost;
        }

        if let Some(rate) = read_env::<u128>("PACKS_CREDITS_PER_TRX") {
            self.economics.credits_per_trx = rate;
        }

        if let Ok(ids) = env::var("PACKS_CATALOG_IDS") {
            self.sync.catalog_ids = parse_id_list(&ids)?;
        }

        if let Some(millis) = read_env::<u64>("PACKS_SETTLE_DELAY_MS") {
            self.tx.settle_delay = Duration::from_millis(millis);
        }

        if let Some(fee_limit) = read_env::<u64>("PACKS_FEE_LIMIT") {
            if fee_limit == 0 {
                return Err(ClientError::Config(
                    "PACKS_FEE_LIMIT must be at least 1 sun".into(),
                ));
            }
            self.tx.fee_limit = fee_limit;
        }

        Ok(self)
    }
}

#[derive(Clone, Debug)]
pub struct ContractConfig {
    /// Deployed contract address
    pub address: String,

    /// ABI JSON describing the contract
    pub abi: String,
}

#[derive(Clone, Debug)]
pub struct NetworkConfig {
    /// Identifier the wallet's node host must contain (e.g. `shasta`)
    pub identifier: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            identifier: "shasta".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EconomicsConfig {
    /// Credits burned by one mint
    pub mint_cost: u128,

    /// Credits granted per staked TRX
    pub credits_per_trx: u128,
}

impl EconomicsConfig {
    /// Credits a stake of `amount` is expected to earn. Display only; the
    /// snapshot always reports what the contract says.
    pub fn credits_preview(&self, amount: TrxAmount) -> u128 {
        u128::from(amount.sun()) * self.credits_per_trx / u128::from(SUN_PER_TRX)
    }
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            mint_cost: 5,
            credits_per_trx: 10,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Pack ids listed in the purchasable catalog
    pub catalog_ids: Vec<u128>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            catalog_ids: vec![1, 2, 3],
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TxConfig {
    /// Delay between broadcast and the post-action refresh
    pub settle_delay: Duration,

    /// Maximum fee a send may burn, in sun
    pub fee_limit: u64,
}

impl Default for TxConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(2_000),
            fee_limit: 1_000_000_000,
        }
    }
}

/// Parse a comma-separated list of decimal ids.
pub fn parse_id_list(raw: &str) -> Result<Vec<u128>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u128>()
                .map_err(|_| ClientError::Config(format!("invalid pack id in list: {}", s)))
        })
        .collect()
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}
