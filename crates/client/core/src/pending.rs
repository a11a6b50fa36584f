//! In-flight action record and progress reporting.
use std::fmt;

use serde::Serialize;

use client_blockchain_core::TransactionId;

use crate::amount::TrxAmount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    Stake,
    Unstake,
    PurchasePack,
    MintNft,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::Stake => "stake",
            ActionKind::Unstake => "unstake",
            ActionKind::PurchasePack => "purchase pack",
            ActionKind::MintNft => "mint NFT",
        };
        write!(f, "{}", label)
    }
}

/// Validated parameters of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ActionParams {
    Stake { amount: TrxAmount },
    Unstake { amount: TrxAmount },
    PurchasePack { pack_id: String, price: TrxAmount },
    MintNft { pack_index: usize },
}

impl ActionParams {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionParams::Stake { .. } => ActionKind::Stake,
            ActionParams::Unstake { .. } => ActionKind::Unstake,
            ActionParams::PurchasePack { .. } => ActionKind::PurchasePack,
            ActionParams::MintNft { .. } => ActionKind::MintNft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionStatus {
    Preparing,
    AwaitingConfirmation,
    Confirmed,
    Failed,
}

impl ActionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::Confirmed | ActionStatus::Failed)
    }

    fn can_become(&self, next: ActionStatus) -> bool {
        matches!(
            (self, next),
            (ActionStatus::Preparing, ActionStatus::AwaitingConfirmation)
                | (ActionStatus::AwaitingConfirmation, ActionStatus::Confirmed)
                | (ActionStatus::Preparing, ActionStatus::Failed)
                | (ActionStatus::AwaitingConfirmation, ActionStatus::Failed)
        )
    }
}

/// One user-triggered action, from preparation to outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub params: ActionParams,
    pub status: ActionStatus,
    pub tx_hash: Option<TransactionId>,
    /// Progress text for the current status
    pub message: String,
}

impl PendingAction {
    pub fn new(params: ActionParams) -> Self {
        let kind = params.kind();
        Self {
            kind,
            params,
            status: ActionStatus::Preparing,
            tx_hash: None,
            message: progress_message(kind, ActionStatus::Preparing).to_string(),
        }
    }

    /// Move to `next`. Returns `false`, leaving the record untouched, for a
    /// transition out of order.
    pub fn advance(&mut self, next: ActionStatus) -> bool {
        if next == ActionStatus::Failed || !self.status.can_become(next) {
            return false;
        }
        self.status = next;
        self.message = progress_message(self.kind, next).to_string();
        true
    }

    /// Mark the action failed with `reason` as its message.
    pub fn fail(&mut self, reason: impl fmt::Display) -> bool {
        if !self.status.can_become(ActionStatus::Failed) {
            return false;
        }
        self.status = ActionStatus::Failed;
        self.message = format!("Failed to {}: {}", self.kind, reason);
        true
    }
}

fn progress_message(kind: ActionKind, status: ActionStatus) -> &'static str {
    match (kind, status) {
        (ActionKind::PurchasePack, ActionStatus::Preparing) => "Preparing purchase...",
        (ActionKind::MintNft, ActionStatus::Preparing) => "Preparing to mint...",
        (_, ActionStatus::Preparing) => "Preparing transaction...",
        (ActionKind::MintNft, ActionStatus::AwaitingConfirmation) => "Minting your NFT...",
        (_, ActionStatus::AwaitingConfirmation) => "Waiting for confirmation...",
        (ActionKind::PurchasePack, ActionStatus::Confirmed) => {
            "Purchase confirmed! Updating data..."
        }
        (ActionKind::MintNft, ActionStatus::Confirmed) => "NFT minted! Updating collection...",
        (_, ActionStatus::Confirmed) => "Transaction confirmed! Updating data...",
        (_, ActionStatus::Failed) => "Failed",
    }
}

/// Receives every status change of an action.
pub trait ActionObserver: Send + Sync {
    fn on_update(&self, action: &PendingAction);
}

impl<F> ActionObserver for F
where
    F: Fn(&PendingAction) + Send + Sync,
{
    fn on_update(&self, action: &PendingAction) {
        self(action)
    }
}
