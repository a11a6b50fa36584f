//! Wallet session: connection to an injected wallet and the active account.
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use client_blockchain_core::{Address, WalletProvider};

use crate::error::{ClientError, Result};

/// A connected wallet account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub address: Address,
    pub connected: bool,
}

/// Owns the wallet connection and the current [`Session`].
pub struct WalletSession {
    wallet: Arc<dyn WalletProvider>,
    network: String,
    session: RwLock<Option<Session>>,
}

impl WalletSession {
    /// `network` is the identifier the wallet's node host must contain.
    pub fn new(wallet: Arc<dyn WalletProvider>, network: impl Into<String>) -> Self {
        Self {
            wallet,
            network: network.into(),
            session: RwLock::new(None),
        }
    }

    pub fn wallet(&self) -> Arc<dyn WalletProvider> {
        Arc::clone(&self.wallet)
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    /// Request account access and check the wallet's network.
    ///
    /// No retry: a declined prompt or a wrong network is returned as is and
    /// the previous session, if any, is dropped.
    pub async fn connect(&self) -> Result<Session> {
        let mut slot = self.session.write().await;
        *slot = None;

        if !self.wallet.is_present() {
            return Err(ClientError::Connection(
                "no wallet extension present".into(),
            ));
        }

        let status = self
            .wallet
            .request_accounts()
            .await
            .map_err(ClientError::from_wallet)?;
        if !status.is_granted() {
            tracing::info!("Account request returned status {}", status.0);
            return Err(ClientError::UserRejected(format!(
                "account access not granted (status {})",
                status.0
            )));
        }

        let account = self
            .wallet
            .account()
            .await
            .map_err(ClientError::from_wallet)?;

        if !account.network.matches(&self.network) {
            tracing::warn!(
                "Wallet is connected to {}, expected {}",
                account.network.host,
                self.network
            );
            return Err(ClientError::WrongNetwork {
                expected: self.network.clone(),
                actual: account.network.host,
            });
        }

        let session = Session {
            address: account.address,
            connected: true,
        };
        tracing::info!("Wallet connected: {}", session.address);

        *slot = Some(session.clone());
        Ok(session)
    }

    pub async fn disconnect(&self) {
        if let Some(session) = self.session.write().await.take() {
            tracing::info!("Wallet disconnected: {}", session.address);
        }
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Address of the connected account.
    pub async fn address(&self) -> Result<Address> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.address.clone())
            .ok_or_else(|| ClientError::Connection("wallet not connected".into()))
    }
}
