//! Blockchain abstraction traits.
//!
//! This module defines the infrastructure layer the contract client builds on:
//! - `ContractTransport`: read-only access to a node (constant calls, receipts)
//! - `WalletProvider`: an injected wallet that owns the keys and signs
//!
//! Reads never touch the wallet's signer, and sends never bypass it.
//!
//! On `wasm32` the futures are not `Send` (they hold JS values), so the
//! traits are declared with `async_trait(?Send)` there.

use async_trait::async_trait;

use crate::types::{
    AbiValue, AccountDescriptor, AccountRequestStatus, Address, ContractCall, SendOptions,
    TransactionId, TransactionStatus,
};

// ============================================================================
// Error Types
// ============================================================================

/// Transport and wallet layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected by user: {0}")]
    Rejected(String),

    #[error("Contract reverted: {0}")]
    Reverted(String),

    #[error("Decoding error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Backend-specific error: {0}")]
    Backend(String),
}

// ============================================================================
// Layer 0: Pure Infrastructure
// ============================================================================

/// Read-only blockchain access.
///
/// Implementations talk to a full node; none of these operations require a
/// signed transaction.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ContractTransport: Send + Sync {
    /// Validate and normalize an address in the backend's encoding.
    fn parse_address(&self, raw: &str) -> Result<Address, TransportError>;

    /// Execute a constant (view) call and decode its outputs.
    async fn call(&self, call: &ContractCall) -> Result<Vec<AbiValue>, TransportError>;

    /// Query transaction status.
    async fn query_transaction(
        &self,
        tx_id: &TransactionId,
    ) -> Result<TransactionStatus, TransportError>;

    /// Health check: verify the node is reachable.
    async fn health_check(&self) -> Result<(), TransportError>;
}

/// Injected wallet: account access plus sign-and-broadcast.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WalletProvider: Send + Sync {
    /// Whether a wallet is available at all (e.g. the browser extension is installed).
    fn is_present(&self) -> bool;

    /// Prompt the user for account access.
    async fn request_accounts(&self) -> Result<AccountRequestStatus, TransportError>;

    /// Currently selected account and the network it is connected to.
    async fn account(&self) -> Result<AccountDescriptor, TransportError>;

    /// Sign and broadcast a state-mutating contract call.
    async fn send(
        &self,
        call: &ContractCall,
        options: &SendOptions,
    ) -> Result<TransactionId, TransportError>;
}
