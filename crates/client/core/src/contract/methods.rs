//! Typed wrappers over the pack contract's methods.
//!
//! Records are returned in raw chain units (sun, seconds); conversion to
//! display types happens in the synchronizer.
use client_blockchain_core::{AbiValue, Address, TransactionId};
use serde::Serialize;

use super::handle::ContractHandle;
use crate::error::{ClientError, Result};

/// `getStakeInfo(address)` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StakeInfo {
    pub amount_sun: u128,
    pub timestamp: u128,
    pub credits: u128,
}

/// `getPackDetails(uint256)` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PackDetails {
    pub id: u128,
    pub price_sun: u128,
    pub exists: bool,
}

/// `getNFTDetails(uint256)` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftDetails {
    pub id: u128,
    pub pack_id: u128,
    pub owner: Address,
    pub minted_at: u128,
}

struct Outputs<'a> {
    method: &'static str,
    values: &'a [AbiValue],
}

impl<'a> Outputs<'a> {
    fn new(method: &'static str, values: &'a [AbiValue]) -> Self {
        Self { method, values }
    }

    fn mismatch(&self, index: usize, expected: &str) -> ClientError {
        ClientError::ReadFailure {
            method: self.method.to_string(),
            message: format!("output {} is not {}", index, expected),
        }
    }

    fn uint(&self, index: usize) -> Result<u128> {
        self.values
            .get(index)
            .and_then(AbiValue::as_uint)
            .ok_or_else(|| self.mismatch(index, "an integer"))
    }

    fn bool(&self, index: usize) -> Result<bool> {
        self.values
            .get(index)
            .and_then(AbiValue::as_bool)
            .ok_or_else(|| self.mismatch(index, "a bool"))
    }

    fn address(&self, index: usize) -> Result<Address> {
        self.values
            .get(index)
            .and_then(AbiValue::as_address)
            .cloned()
            .ok_or_else(|| self.mismatch(index, "an address"))
    }

    fn uint_list(&self, index: usize) -> Result<Vec<u128>> {
        self.values
            .get(index)
            .and_then(AbiValue::as_array)
            .and_then(|items| items.iter().map(AbiValue::as_uint).collect())
            .ok_or_else(|| self.mismatch(index, "an integer array"))
    }
}

impl ContractHandle {
    pub async fn stake(&self, amount_sun: u64) -> Result<TransactionId> {
        self.send("stake", vec![], self.options(amount_sun)).await
    }

    pub async fn unstake(&self, amount_sun: u64) -> Result<TransactionId> {
        self.send(
            "unstake",
            vec![AbiValue::Uint(u128::from(amount_sun))],
            self.options(0),
        )
        .await
    }

    pub async fn purchase_pack(&self, pack_id: u128, price_sun: u64) -> Result<TransactionId> {
        self.send(
            "purchasePack",
            vec![AbiValue::Uint(pack_id)],
            self.options(price_sun),
        )
        .await
    }

    pub async fn mint_nft(&self, pack_index: u128) -> Result<TransactionId> {
        self.send("mintNFT", vec![AbiValue::Uint(pack_index)], self.options(0))
            .await
    }

    pub async fn get_stake_info(&self, user: &Address) -> Result<StakeInfo> {
        let values = self
            .call("getStakeInfo", vec![AbiValue::Address(user.clone())])
            .await?;
        let out = Outputs::new("getStakeInfo", &values);

        Ok(StakeInfo {
            amount_sun: out.uint(0)?,
            timestamp: out.uint(1)?,
            credits: out.uint(2)?,
        })
    }

    pub async fn get_bandwidth_credits(&self, user: &Address) -> Result<u128> {
        let values = self
            .call("getBandwidthCredits", vec![AbiValue::Address(user.clone())])
            .await?;
        Outputs::new("getBandwidthCredits", &values).uint(0)
    }

    pub async fn get_user_packs(&self, user: &Address) -> Result<Vec<u128>> {
        let values = self
            .call("getUserPacks", vec![AbiValue::Address(user.clone())])
            .await?;
        Outputs::new("getUserPacks", &values).uint_list(0)
    }

    pub async fn get_user_nfts(&self, user: &Address) -> Result<Vec<u128>> {
        let values = self
            .call("getUserNFTs", vec![AbiValue::Address(user.clone())])
            .await?;
        Outputs::new("getUserNFTs", &values).uint_list(0)
    }

    pub async fn get_pack_details(&self, pack_id: u128) -> Result<PackDetails> {
        let values = self
            .call("getPackDetails", vec![AbiValue::Uint(pack_id)])
            .await?;
        let out = Outputs::new("getPackDetails", &values);

        Ok(PackDetails {
            id: out.uint(0)?,
            price_sun: out.uint(1)?,
            exists: out.bool(2)?,
        })
    }

    pub async fn get_nft_details(&self, nft_id: u128) -> Result<NftDetails> {
        let values = self
            .call("getNFTDetails", vec![AbiValue::Uint(nft_id)])
            .await?;
        let out = Outputs::new("getNFTDetails", &values);

        Ok(NftDetails {
            id: out.uint(0)?,
            pack_id: out.uint(1)?,
            owner: out.address(2)?,
            minted_at: out.uint(3)?,
        })
    }
}
