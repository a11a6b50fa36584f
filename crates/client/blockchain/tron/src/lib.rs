//! TRON backend for the pack client.
//!
//! - [`TronGridTransport`]: constant calls, receipts and health checks over the
//!   TronGrid full-node HTTP API.
//! - [`TronLinkWallet`] (wasm32 only): account access and sign-and-broadcast
//!   through the TronLink browser extension.
//! - [`TronAddress`]: base58check address codec.

pub mod abi;
pub mod address;
pub mod config;
pub mod transport;

#[cfg(target_arch = "wasm32")]
pub mod tronlink;

pub use address::{AddressError, TronAddress};
pub use config::{TronConfig, TronNetwork};
pub use transport::TronGridTransport;

#[cfg(target_arch = "wasm32")]
pub use tronlink::TronLinkWallet;
