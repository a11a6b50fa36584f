//! Read-only pack client for the terminal.
//!
//! # Architecture
//!
//! ```text
//! Client (composition root)
//!   ├─→ TronGridTransport (constant calls, receipts, health)
//!   ├─→ ContractHandle (bound address + ABI)
//!   └─→ Synchronizer (account snapshots)
//! ```
//!
//! There is no wallet on the command line, so nothing here can send a
//! transaction. Staking, purchases and mints go through the browser build,
//! where TronLink signs.

mod builder;
pub mod logging;

pub use builder::ClientBuilder;

use anyhow::{Context, Result};
use client_blockchain_core::{TransactionId, TransactionStatus};
use client_blockchain_tron::TronConfig;
use client_core::{
    AppConfig, ContractHandle, NftDetails, PackDetails, PackRef, Synchronizer, TrxAmount,
    UserSnapshot,
};

/// Bound contract plus the config it was built from.
pub struct Client {
    config: AppConfig,
    tron: TronConfig,
    contract: ContractHandle,
    synchronizer: Synchronizer,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn tron(&self) -> &TronConfig {
        &self.tron
    }

    pub fn contract(&self) -> &ContractHandle {
        &self.contract
    }

    /// Full snapshot for `address`.
    pub async fn status(&self, address: &str) -> Result<UserSnapshot> {
        let address = self.contract.parse_address(address)?;
        let snapshot = self
            .synchronizer
            .refresh(&address)
            .await
            .with_context(|| format!("Failed to load state for {}", address))?;
        Ok(snapshot)
    }

    /// Configured catalog packs that exist on chain.
    ///
    /// Unlike a snapshot refresh, a failing read is an error here.
    pub async fn catalog(&self) -> Result<Vec<PackRef>> {
        let mut packs = Vec::new();

        for id in &self.config.sync.catalog_ids {
            let details = self.contract.get_pack_details(*id).await?;
            if details.exists {
                packs.push(PackRef {
                    id: details.id.to_string(),
                    price: TrxAmount::try_from_sun(details.price_sun)?,
                    exists: true,
                    position: None,
                });
            } else {
                tracing::debug!("Catalog pack {} does not exist", id);
            }
        }

        Ok(packs)
    }

    pub async fn pack(&self, id: u128) -> Result<PackDetails> {
        Ok(self.contract.get_pack_details(id).await?)
    }

    pub async fn nft(&self, id: u128) -> Result<NftDetails> {
        Ok(self.contract.get_nft_details(id).await?)
    }

    pub async fn bandwidth_credits(&self, address: &str) -> Result<u128> {
        let address = self.contract.parse_address(address)?;
        Ok(self.contract.get_bandwidth_credits(&address).await?)
    }

    /// Receipt status of `tx_hash` as the node reports it.
    pub async fn transaction(&self, tx_hash: &str) -> Result<TransactionStatus> {
        let tx_hash = tx_hash.trim().trim_start_matches("0x");
        if tx_hash.len() != 64 || hex::decode(tx_hash).is_err() {
            anyhow::bail!("Transaction hash must be 64 hex characters");
        }

        let status = self
            .contract
            .transport()
            .query_transaction(&TransactionId::new(tx_hash))
            .await
            .context("Failed to query transaction")?;
        Ok(status)
    }

    /// Explorer link for `tx_hash` on the configured network, if it has one.
    pub fn explorer_url(&self, tx_hash: &str) -> Option<String> {
        self.tron.network.explorer_tx_url(tx_hash)
    }

    pub async fn health(&self) -> Result<()> {
        self.contract
            .transport()
            .health_check()
            .await
            .context("Node health check failed")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use client_blockchain_core::{
        AbiValue, Address, ContractCall, ContractHandler, MockChain, SendOptions, TransportError,
    };

    use super::*;

    const CONTRACT: &str = "TPackContract";

    /// Packs 1 and 3 exist; NFT 7 belongs to `TOwner`.
    struct Catalog;

    impl ContractHandler for Catalog {
        fn call(&self, call: &ContractCall) -> Result<Vec<AbiValue>, TransportError> {
            let id = call.args.first().and_then(AbiValue::as_uint).unwrap_or(0);
            match (call.method.as_str(), id) {
                ("getPackDetails", 1 | 3) => Ok(vec![
                    AbiValue::Uint(id),
                    AbiValue::Uint(id * 5_000_000),
                    AbiValue::Bool(true),
                ]),
                ("getPackDetails", _) => Ok(vec![
                    AbiValue::Uint(0),
                    AbiValue::Uint(0),
                    AbiValue::Bool(false),
                ]),
                ("getNFTDetails", _) => Ok(vec![
                    AbiValue::Uint(id),
                    AbiValue::Uint(1),
                    AbiValue::Address(Address::new_unchecked("TOwner")),
                    AbiValue::Uint(1_700_000_000),
                ]),
                ("getBandwidthCredits", _) => Ok(vec![AbiValue::Uint(42)]),
                (other, _) => Err(TransportError::Unsupported(other.to_string())),
            }
        }

        fn send(
            &self,
            _sender: &Address,
            _call: &ContractCall,
            _options: &SendOptions,
        ) -> Result<(), TransportError> {
            Err(TransportError::Unsupported("read-only".into()))
        }
    }

    async fn client(chain: &MockChain) -> Client {
        Client::builder()
            .config(AppConfig::new(CONTRACT))
            .transport(Arc::new(chain.clone()))
            .build()
            .await
            .expect("client should build")
    }

    #[tokio::test]
    async fn catalog_skips_missing_packs() {
        let chain = MockChain::new().with_handler(Catalog);
        let client = client(&chain).await;

        let catalog = client.catalog().await.unwrap();
        let ids: Vec<_> = catalog.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(catalog[1].price.to_string(), "15");
    }

    #[tokio::test]
    async fn lookups_are_reads_only() {
        let chain = MockChain::new().with_handler(Catalog);
        let client = client(&chain).await;

        assert_eq!(client.nft(7).await.unwrap().owner.as_str(), "TOwner");
        assert_eq!(client.bandwidth_credits("TOwner").await.unwrap(), 42);
        assert!(!client.pack(2).await.unwrap().exists);
        assert!(chain.sends().is_empty());
    }

    #[tokio::test]
    async fn rejects_malformed_tx_hash() {
        let chain = MockChain::new().with_handler(Catalog);
        let client = client(&chain).await;

        assert!(client.transaction("abc").await.is_err());
        let pending = client.transaction(&"0".repeat(64)).await.unwrap();
        assert_eq!(pending, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn build_fails_on_unreachable_node() {
        let chain = MockChain::new().with_handler(Catalog).unreachable();
        let result = Client::builder()
            .config(AppConfig::new(CONTRACT))
            .transport(Arc::new(chain))
            .build()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn build_requires_config() {
        assert!(Client::builder().build().await.is_err());
    }
}
