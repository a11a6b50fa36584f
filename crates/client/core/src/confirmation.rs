//! Waiting for a broadcast transaction to settle.
//!
//! The default strategy only sleeps: a broadcast is never treated as more
//! than "broadcast" unless [`ConfirmationStrategy::ReceiptPolling`] is chosen
//! and the node reports a receipt.
use std::time::Duration;

use client_blockchain_core::{ContractTransport, TransactionId, TransactionStatus};

use crate::error::{ClientError, Result};
use crate::platform;

/// What the wait established about a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Broadcast only; inclusion was not checked
    Assumed,

    /// The node reported a successful receipt
    Confirmed { block_height: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStrategy {
    /// Return at once (tests, or callers that poll on their own)
    Immediate,

    /// Sleep for a fixed settle delay
    FixedDelay(Duration),

    /// Query the receipt up to `max_attempts` times, `interval` apart
    ReceiptPolling { interval: Duration, max_attempts: u32 },
}

impl Default for ConfirmationStrategy {
    fn default() -> Self {
        ConfirmationStrategy::FixedDelay(Duration::from_millis(2_000))
    }
}

impl ConfirmationStrategy {
    pub async fn wait(
        &self,
        transport: &dyn ContractTransport,
        tx_id: &TransactionId,
    ) -> Result<Confirmation> {
        match *self {
            ConfirmationStrategy::Immediate => Ok(Confirmation::Assumed),
            ConfirmationStrategy::FixedDelay(delay) => {
                tracing::debug!("Waiting {:?} for {} to settle", delay, tx_id);
                platform::sleep(delay).await;
                Ok(Confirmation::Assumed)
            }
            ConfirmationStrategy::ReceiptPolling {
                interval,
                max_attempts,
            } => poll_receipt(transport, tx_id, interval, max_attempts).await,
        }
    }
}

async fn poll_receipt(
    transport: &dyn ContractTransport,
    tx_id: &TransactionId,
    interval: Duration,
    max_attempts: u32,
) -> Result<Confirmation> {
    for attempt in 1..=max_attempts {
        match transport.query_transaction(tx_id).await {
            Ok(TransactionStatus::Confirmed { block_height }) => {
                tracing::info!("{} confirmed in block {}", tx_id, block_height);
                return Ok(Confirmation::Confirmed { block_height });
            }
            Ok(TransactionStatus::Failed { error }) => {
                tracing::warn!("{} failed on-chain: {}", tx_id, error);
                return Err(ClientError::SendFailure(error));
            }
            Ok(TransactionStatus::Pending) => {
                tracing::debug!("{} pending (attempt {}/{})", tx_id, attempt, max_attempts);
            }
            Err(e) => {
                tracing::warn!("receipt query for {} failed: {}", tx_id, e);
            }
        }

        if attempt < max_attempts {
            platform::sleep(interval).await;
        }
    }

    tracing::warn!(
        "{} still unconfirmed after {} attempts, continuing",
        tx_id,
        max_attempts
    );
    Ok(Confirmation::Assumed)
}
