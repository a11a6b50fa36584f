//! View-state produced by a refresh.
use chrono::{DateTime, Utc};
use serde::Serialize;

use client_blockchain_core::Address;

use crate::amount::TrxAmount;

/// A pack, either owned or listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackRef {
    pub id: String,
    pub price: TrxAmount,
    pub exists: bool,
    /// Index in the account's on-chain pack list, which `mintNFT` takes.
    /// `None` for catalog entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

/// A minted NFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftRef {
    pub id: String,
    pub pack_id: String,
    pub owner: Address,
    pub minted_at: DateTime<Utc>,
}

/// Everything the client knows about one account, as of the last refresh.
///
/// Built wholesale from contract reads; never patched locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserSnapshot {
    /// Account the snapshot was read for (`None` before the first refresh)
    pub address: Option<Address>,
    pub staked_amount: TrxAmount,
    /// Seconds since the epoch of the last stake, as reported by the contract
    pub stake_timestamp: u128,
    pub bandwidth_credits: u128,
    pub packs: Vec<PackRef>,
    pub nfts: Vec<NftRef>,
    /// Purchasable packs
    pub catalog: Vec<PackRef>,
}

impl UserSnapshot {
    pub fn can_mint(&self, mint_cost: u128) -> bool {
        self.bandwidth_credits >= mint_cost
    }

    pub fn is_empty(&self) -> bool {
        self.staked_amount.is_zero() && self.packs.is_empty() && self.nfts.is_empty()
    }
}
