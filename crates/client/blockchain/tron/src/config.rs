//! TRON network configuration.

use std::env;
use std::fmt;
use std::str::FromStr;

use client_blockchain_core::BlockchainConfig;

/// TRON network types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TronNetwork {
    /// TRON mainnet
    Mainnet,
    /// Shasta testnet
    Shasta,
    /// Nile testnet
    Nile,
    /// Local private network (e.g. tronbox/tre)
    Local,
}

impl TronNetwork {
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            TronNetwork::Mainnet => "https://api.trongrid.io",
            TronNetwork::Shasta => "https://api.shasta.trongrid.io",
            TronNetwork::Nile => "https://nile.trongrid.io",
            TronNetwork::Local => "http://127.0.0.1:9090",
        }
    }

    /// Identifier matched against the wallet's full-node host.
    pub fn identifier(&self) -> &'static str {
        match self {
            TronNetwork::Mainnet => "mainnet",
            TronNetwork::Shasta => "shasta",
            TronNetwork::Nile => "nile",
            TronNetwork::Local => "local",
        }
    }

    /// Block explorer link for a transaction.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        let base = match self {
            TronNetwork::Mainnet => "https://tronscan.org",
            TronNetwork::Shasta => "https://shasta.tronscan.org",
            TronNetwork::Nile => "https://nile.tronscan.org",
            TronNetwork::Local => return None,
        };
        Some(format!("{}/#/transaction/{}", base, tx_hash))
    }
}

impl fmt::Display for TronNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for TronNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(TronNetwork::Mainnet),
            "shasta" => Ok(TronNetwork::Shasta),
            "nile" => Ok(TronNetwork::Nile),
            "local" => Ok(TronNetwork::Local),
            other => Err(format!(
                "Invalid TRON_NETWORK: {}. Must be mainnet, shasta, nile, or local",
                other
            )),
        }
    }
}

/// TRON-specific configuration.
#[derive(Debug, Clone)]
pub struct TronConfig {
    /// TRON network to connect to
    pub network: TronNetwork,

    /// Custom full-node endpoint URL (overrides network default)
    pub rpc_url: Option<String>,

    /// TronGrid API key, sent as `TRON-PRO-API-KEY`
    pub api_key: Option<String>,
}

impl TronConfig {
    /// Create a new TRON configuration.
    pub fn new(network: TronNetwork) -> Self {
        Self {
            network,
            rpc_url: None,
            api_key: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TRON_NETWORK` - Network name (mainnet, shasta, nile, local) (default: shasta)
    /// - `TRON_RPC_URL` - Custom full-node endpoint URL
    /// - `TRON_API_KEY` - TronGrid API key
    pub fn from_env() -> Result<Self, String> {
        let network = env::var("TRON_NETWORK")
            .unwrap_or_else(|_| "shasta".to_string())
            .parse::<TronNetwork>()?;

        Ok(Self {
            network,
            rpc_url: env::var("TRON_RPC_URL").ok().filter(|s| !s.is_empty()),
            api_key: env::var("TRON_API_KEY").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Set custom RPC URL.
    pub fn with_rpc_url(mut self, url: String) -> Self {
        self.rpc_url = Some(url);
        self
    }

    /// Set API key.
    pub fn with_api_key(mut self, key: String) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Get the RPC URL (custom or default for network), without trailing slash.
    pub fn get_rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_rpc_url())
            .trim_end_matches('/')
    }
}

impl BlockchainConfig for TronConfig {
    fn network_name(&self) -> &str {
        match self.network {
            TronNetwork::Mainnet => "tron-mainnet",
            TronNetwork::Shasta => "tron-shasta",
            TronNetwork::Nile => "tron-nile",
            TronNetwork::Local => "tron-local",
        }
    }

    fn rpc_url(&self) -> &str {
        self.get_rpc_url()
    }

    fn validate(&self) -> Result<(), String> {
        let url = self.get_rpc_url();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(format!("Invalid RPC URL format: {}", url));
        }

        if let Some(ref key) = self.api_key
            && key.trim().is_empty()
        {
            return Err("API key cannot be blank".to_string());
        }

        Ok(())
    }
}

impl Default for TronConfig {
    fn default() -> Self {
        Self::new(TronNetwork::Shasta)
    }
}
