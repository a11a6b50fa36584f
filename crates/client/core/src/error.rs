//! Error taxonomy surfaced by the client.
//!
//! Transport and wallet failures arrive as [`TransportError`] and are mapped
//! here at the contract boundary, so callers only ever match on
//! [`ClientError`].
use client_blockchain_core::{TransactionId, TransportError};
use thiserror::Error;

use crate::pending::PendingAction;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("wallet connection failed: {0}")]
    Connection(String),

    #[error("wallet is on the wrong network: expected {expected}, connected to {actual}")]
    WrongNetwork { expected: String, actual: String },

    #[error("request rejected in wallet: {0}")]
    UserRejected(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient bandwidth credits: have {available}, need {required}")]
    InsufficientCredits { available: u128, required: u128 },

    #[error("failed to bind contract: {0}")]
    Bind(String),

    #[error("transaction failed: {0}")]
    SendFailure(String),

    #[error("{method} read failed: {message}")]
    ReadFailure { method: String, message: String },

    #[error("state synchronization failed: {0}")]
    Sync(String),

    /// An action failed after it started; `action` is its `Failed` record.
    #[error("{} failed: {source}", .action.kind)]
    ActionFailed {
        action: Box<PendingAction>,
        #[source]
        source: Box<ClientError>,
    },

    /// `action` is the `Confirmed` record of the broadcast transaction.
    #[error("transaction {tx_hash} was broadcast but refreshing state failed")]
    RefreshFailed {
        tx_hash: TransactionId,
        action: Box<PendingAction>,
        #[source]
        source: Box<ClientError>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Map a failure from the signing path.
    pub fn from_send(error: TransportError) -> Self {
        match error {
            TransportError::Rejected(message) => ClientError::UserRejected(message),
            TransportError::Unsupported(message) => {
                ClientError::Connection(format!("wallet cannot send: {}", message))
            }
            other => ClientError::SendFailure(other.to_string()),
        }
    }

    /// Map a failure from a constant call.
    pub fn from_read(method: &str, error: TransportError) -> Self {
        ClientError::ReadFailure {
            method: method.to_string(),
            message: error.to_string(),
        }
    }

    /// Map a failure while talking to the wallet outside of a send.
    pub fn from_wallet(error: TransportError) -> Self {
        match error {
            TransportError::Rejected(message) => ClientError::UserRejected(message),
            other => ClientError::Connection(other.to_string()),
        }
    }

    /// Transaction id attached to the error, when the transaction was broadcast.
    pub fn broadcast_tx(&self) -> Option<&TransactionId> {
        match self {
            ClientError::RefreshFailed { tx_hash, .. } => Some(tx_hash),
            ClientError::ActionFailed { action, .. } => action.tx_hash.as_ref(),
            _ => None,
        }
    }

    /// Final record of the action that produced this error, if any.
    pub fn action(&self) -> Option<&PendingAction> {
        match self {
            ClientError::ActionFailed { action, .. }
            | ClientError::RefreshFailed { action, .. } => Some(&**action),
            _ => None,
        }
    }

    /// The underlying failure, with the action record unwrapped.
    pub fn cause(&self) -> &ClientError {
        match self {
            ClientError::ActionFailed { source, .. } => source.cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_maps_to_user_rejected() {
        let err = ClientError::from_send(TransportError::Rejected("declined".into()));
        assert_eq!(err, ClientError::UserRejected("declined".into()));
    }

    #[test]
    fn revert_maps_to_send_failure() {
        let err = ClientError::from_send(TransportError::Reverted("no credits".into()));
        assert!(matches!(err, ClientError::SendFailure(msg) if msg.contains("no credits")));
    }

    #[test]
    fn read_failure_names_the_method() {
        let err = ClientError::from_read("getUserPacks", TransportError::Network("timeout".into()));
        assert_eq!(
            err.to_string(),
            "getUserPacks read failed: Network error: timeout"
        );
    }
}
