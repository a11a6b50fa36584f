//! Blockchain abstraction layer for the pack client.
//!
//! This crate provides the chain-agnostic infrastructure the contract client
//! is written against.
//!
//! # Architecture
//!
//! ```text
//! client-core (domain: stake, packs, NFTs)
//!     │
//!     ├── ContractTransport   reads, receipts, health (no signer)
//!     └── WalletProvider      account access, sign + broadcast
//!             │
//!     client-blockchain-tron  (TronGrid HTTP, TronLink)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{ContractTransport, WalletProvider};
//!
//! async fn read(node: &dyn ContractTransport, call: &ContractCall) {
//!     let outputs = node.call(call).await?;
//! }
//! ```

pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export all traits
pub use traits::{ContractTransport, TransportError, WalletProvider};

// Re-export all types
pub use types::{
    AbiType, AbiValue, AccountDescriptor, AccountRequestStatus, Address, BlockchainConfig,
    ContractCall, NetworkDescriptor, SendOptions, TransactionId, TransactionStatus,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::{ContractHandler, MockChain, RecordedSend};
