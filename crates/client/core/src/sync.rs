//! View-state synchronizer.
//!
//! A refresh reads the stake record, the owned pack and NFT lists with one
//! detail read per id, and the configured catalog packs. The new snapshot
//! replaces the old one only if every required read succeeded.
use chrono::{DateTime, Utc};
use futures::future::{join_all, try_join_all};
use tokio::sync::RwLock;

use client_blockchain_core::Address;

use crate::amount::TrxAmount;
use crate::contract::{ContractHandle, NftDetails, PackDetails};
use crate::error::{ClientError, Result};
use crate::snapshot::{NftRef, PackRef, UserSnapshot};

pub struct Synchronizer {
    contract: ContractHandle,
    catalog_ids: Vec<u128>,
    snapshot: RwLock<UserSnapshot>,
}

impl Synchronizer {
    pub fn new(contract: ContractHandle, catalog_ids: Vec<u128>) -> Self {
        Self {
            contract,
            catalog_ids,
            snapshot: RwLock::new(UserSnapshot::default()),
        }
    }

    pub fn contract(&self) -> &ContractHandle {
        &self.contract
    }

    /// Rebuild the snapshot for `address`.
    ///
    /// On failure the previous snapshot is kept and [`ClientError::Sync`]
    /// carries the failing read.
    pub async fn refresh(&self, address: &Address) -> Result<UserSnapshot> {
        tracing::debug!("Refreshing state for {}", address);

        match self.load(address).await {
            Ok(snapshot) => {
                *self.snapshot.write().await = snapshot.clone();
                tracing::debug!(
                    "Snapshot updated: {} credits, {} packs, {} NFTs, {} catalog packs",
                    snapshot.bandwidth_credits,
                    snapshot.packs.len(),
                    snapshot.nfts.len(),
                    snapshot.catalog.len()
                );
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!("Refresh for {} failed: {}", address, e);
                Err(ClientError::Sync(e.to_string()))
            }
        }
    }

    /// Last successfully built snapshot.
    pub async fn snapshot(&self) -> UserSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn clear(&self) {
        *self.snapshot.write().await = UserSnapshot::default();
    }

    async fn load(&self, address: &Address) -> Result<UserSnapshot> {
        let stake = self.contract.get_stake_info(address).await?;

        let pack_ids = self.contract.get_user_packs(address).await?;
        let pack_details =
            try_join_all(pack_ids.iter().map(|id| self.contract.get_pack_details(*id))).await?;
        // Keep on-chain positions; filtering shifts the visible indices
        let packs = pack_details
            .into_iter()
            .enumerate()
            .filter(|(_, p)| p.exists)
            .map(|(position, p)| pack_ref(p, Some(position)))
            .collect::<Result<Vec<_>>>()?;

        let nft_ids = self.contract.get_user_nfts(address).await?;
        let nft_details =
            try_join_all(nft_ids.iter().map(|id| self.contract.get_nft_details(*id))).await?;
        let nfts = nft_details
            .into_iter()
            .filter(|n| n.id != 0)
            .map(nft_ref)
            .collect::<Result<Vec<_>>>()?;

        let catalog = self.load_catalog().await;

        Ok(UserSnapshot {
            address: Some(address.clone()),
            staked_amount: TrxAmount::try_from_sun(stake.amount_sun)?,
            stake_timestamp: stake.timestamp,
            bandwidth_credits: stake.credits,
            packs,
            nfts,
            catalog,
        })
    }

    /// Catalog reads are best-effort: a failing or absent pack is left out.
    async fn load_catalog(&self) -> Vec<PackRef> {
        let results = join_all(
            self.catalog_ids
                .iter()
                .map(|id| self.contract.get_pack_details(*id)),
        )
        .await;

        self.catalog_ids
            .iter()
            .zip(results)
            .filter_map(|(id, result)| match result {
                Ok(details) if details.exists => match pack_ref(details, None) {
                    Ok(pack) => Some(pack),
                    Err(e) => {
                        tracing::warn!("Catalog pack {} skipped: {}", id, e);
                        None
                    }
                },
                Ok(_) => {
                    tracing::debug!("Catalog pack {} does not exist", id);
                    None
                }
                Err(e) => {
                    tracing::warn!("Catalog pack {} unavailable: {}", id, e);
                    None
                }
            })
            .collect()
    }
}

fn pack_ref(details: PackDetails, position: Option<usize>) -> Result<PackRef> {
    Ok(PackRef {
        id: details.id.to_string(),
        price: TrxAmount::try_from_sun(details.price_sun)?,
        exists: details.exists,
        position,
    })
}

fn nft_ref(details: NftDetails) -> Result<NftRef> {
    let minted_at = i64::try_from(details.minted_at)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or_else(|| ClientError::ReadFailure {
            method: "getNFTDetails".into(),
            message: format!("invalid mint timestamp {}", details.minted_at),
        })?;

    Ok(NftRef {
        id: details.id.to_string(),
        pack_id: details.pack_id.to_string(),
        owner: details.owner,
        minted_at,
    })
}
