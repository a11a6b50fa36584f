//! Client builder with dependency injection pattern.

use std::sync::Arc;

use anyhow::{Context, Result};
use client_blockchain_core::ContractTransport;
use client_blockchain_tron::{TronConfig, TronGridTransport};
use client_core::{AppConfig, ContractHandle, Synchronizer};

use crate::Client;

/// Builder for a read-only [`Client`].
///
/// The app config is required. The TRON config defaults to Shasta, and a
/// transport can be injected in place of TronGrid.
#[derive(Default)]
pub struct ClientBuilder {
    config: Option<AppConfig>,
    tron: Option<TronConfig>,
    transport: Option<Arc<dyn ContractTransport>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application config (required).
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the TRON node config. Ignored when a transport is injected.
    pub fn tron(mut self, tron: TronConfig) -> Self {
        self.tron = Some(tron);
        self
    }

    /// Use `transport` instead of building a TronGrid client.
    pub fn transport(mut self, transport: Arc<dyn ContractTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the transport and bind the contract.
    pub async fn build(self) -> Result<Client> {
        let config = self
            .config
            .context("App config is required. Use .config() to set it.")?;
        let tron = self.tron.unwrap_or_default();

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                tracing::debug!("Connecting to {}", tron.get_rpc_url());
                Arc::new(
                    TronGridTransport::new(tron.clone())
                        .context("Failed to create TronGrid transport")?,
                )
            }
        };

        let contract = ContractHandle::bind(transport, &config.contract.address, &config.contract.abi)
            .await
            .context("Failed to bind pack contract")?
            .with_fee_limit(config.tx.fee_limit);

        let synchronizer = Synchronizer::new(contract.clone(), config.sync.catalog_ids.clone());

        Ok(Client {
            config,
            tron,
            contract,
            synchronizer,
        })
    }
}
