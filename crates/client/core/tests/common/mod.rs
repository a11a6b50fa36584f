//! Shared fixtures: an in-memory pack contract on top of `MockChain`.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use client_blockchain_core::{
    AbiValue, Address, ContractCall, ContractHandler, ContractTransport, MockChain, SendOptions,
    TransportError,
};
use client_core::{
    ActionClient, BUNDLED_ABI, ConfirmationStrategy, ContractHandle, PendingAction,
    WalletSession,
};

pub const USER: &str = "TUserAccount111";
pub const OTHER_USER: &str = "TOtherAccount22";
pub const CONTRACT: &str = "TPackContract33";
pub const SHASTA_HOST: &str = "https://api.shasta.trongrid.io";
pub const ZERO_ADDRESS: &str = "T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb";

const SUN_PER_TRX: u128 = 1_000_000;
const MINT_EPOCH: u128 = 1_700_000_000;

#[derive(Default, Clone, Copy)]
struct Stake {
    amount: u128,
    timestamp: u128,
    credits: u128,
}

struct NftRecord {
    pack_id: u128,
    owner: String,
    minted_at: u128,
}

struct SimState {
    credits_per_trx: u128,
    mint_cost: u128,
    catalog: BTreeMap<u128, u128>,
    stakes: HashMap<String, Stake>,
    packs: HashMap<String, Vec<u128>>,
    nfts: HashMap<String, Vec<u128>>,
    nft_records: HashMap<u128, NftRecord>,
    next_nft_id: u128,
    clock: u128,
    failing_reads: HashSet<String>,
    failing_packs: HashSet<u128>,
    revert_next: Option<String>,
}

/// Pack contract behaviour: 10 credits per staked TRX, 5 credits per mint,
/// catalog packs 1 (10 TRX) and 3 (25 TRX). Pack 2 does not exist.
#[derive(Clone)]
pub struct PackContractSim {
    state: Arc<Mutex<SimState>>,
}

impl PackContractSim {
    pub fn new() -> Self {
        let mut catalog = BTreeMap::new();
        catalog.insert(1, 10 * SUN_PER_TRX);
        catalog.insert(3, 25 * SUN_PER_TRX);

        Self {
            state: Arc::new(Mutex::new(SimState {
                credits_per_trx: 10,
                mint_cost: 5,
                catalog,
                stakes: HashMap::new(),
                packs: HashMap::new(),
                nfts: HashMap::new(),
                nft_records: HashMap::new(),
                next_nft_id: 1,
                clock: MINT_EPOCH,
                failing_reads: HashSet::new(),
                failing_packs: HashSet::new(),
                revert_next: None,
            })),
        }
    }

    /// Every read of `method` fails until [`heal`](Self::heal).
    pub fn fail_reads(&self, method: &str) {
        self.state.lock().unwrap().failing_reads.insert(method.to_string());
    }

    /// `getPackDetails(pack_id)` fails until [`heal`](Self::heal).
    pub fn fail_pack_reads(&self, pack_id: u128) {
        self.state.lock().unwrap().failing_packs.insert(pack_id);
    }

    pub fn heal(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing_reads.clear();
        state.failing_packs.clear();
    }

    /// The next send reverts with `reason`.
    pub fn revert_next_send(&self, reason: &str) {
        self.state.lock().unwrap().revert_next = Some(reason.to_string());
    }

    /// Put `pack_id` in `owner`'s pack list without a purchase.
    pub fn grant_pack(&self, owner: &str, pack_id: u128) {
        self.state
            .lock()
            .unwrap()
            .packs
            .entry(owner.to_string())
            .or_default()
            .push(pack_id);
    }

    /// Put a bare NFT id in `owner`'s list without a record behind it.
    pub fn grant_dangling_nft(&self, owner: &str, nft_id: u128) {
        self.state
            .lock()
            .unwrap()
            .nfts
            .entry(owner.to_string())
            .or_default()
            .push(nft_id);
    }

    pub fn credits_of(&self, owner: &str) -> u128 {
        self.state
            .lock()
            .unwrap()
            .stakes
            .get(owner)
            .map(|s| s.credits)
            .unwrap_or(0)
    }
}

fn uint_arg(call: &ContractCall, index: usize) -> Result<u128, TransportError> {
    call.args
        .get(index)
        .and_then(AbiValue::as_uint)
        .ok_or_else(|| TransportError::Decode(format!("{}: bad argument {}", call.method, index)))
}

fn address_arg(call: &ContractCall, index: usize) -> Result<String, TransportError> {
    call.args
        .get(index)
        .and_then(AbiValue::as_address)
        .map(|a| a.as_str().to_string())
        .ok_or_else(|| TransportError::Decode(format!("{}: bad argument {}", call.method, index)))
}

fn uint_list(ids: Option<&Vec<u128>>) -> Vec<AbiValue> {
    vec![AbiValue::Array(
        ids.into_iter().flatten().map(|id| AbiValue::Uint(*id)).collect(),
    )]
}

impl ContractHandler for PackContractSim {
    fn call(&self, call: &ContractCall) -> Result<Vec<AbiValue>, TransportError> {
        let state = self.state.lock().unwrap();

        if state.failing_reads.contains(&call.method) {
            return Err(TransportError::Network("connection reset by peer".into()));
        }

        match call.method.as_str() {
            "getStakeInfo" => {
                let stake = state
                    .stakes
                    .get(&address_arg(call, 0)?)
                    .copied()
                    .unwrap_or_default();
                Ok(vec![
                    AbiValue::Uint(stake.amount),
                    AbiValue::Uint(stake.timestamp),
                    AbiValue::Uint(stake.credits),
                ])
            }
            "getBandwidthCredits" => {
                let stake = state
                    .stakes
                    .get(&address_arg(call, 0)?)
                    .copied()
                    .unwrap_or_default();
                Ok(vec![AbiValue::Uint(stake.credits)])
            }
            "getUserPacks" => Ok(uint_list(state.packs.get(&address_arg(call, 0)?))),
            "getUserNFTs" => Ok(uint_list(state.nfts.get(&address_arg(call, 0)?))),
            "getPackDetails" => {
                let id = uint_arg(call, 0)?;
                if state.failing_packs.contains(&id) {
                    return Err(TransportError::Network("timeout".into()));
                }
                Ok(match state.catalog.get(&id) {
                    Some(price) => vec![
                        AbiValue::Uint(id),
                        AbiValue::Uint(*price),
                        AbiValue::Bool(true),
                    ],
                    None => vec![AbiValue::Uint(0), AbiValue::Uint(0), AbiValue::Bool(false)],
                })
            }
            "getNFTDetails" => {
                let id = uint_arg(call, 0)?;
                Ok(match state.nft_records.get(&id) {
                    Some(record) => vec![
                        AbiValue::Uint(id),
                        AbiValue::Uint(record.pack_id),
                        AbiValue::Address(Address::new_unchecked(record.owner.clone())),
                        AbiValue::Uint(record.minted_at),
                    ],
                    None => vec![
                        AbiValue::Uint(0),
                        AbiValue::Uint(0),
                        AbiValue::Address(Address::new_unchecked(ZERO_ADDRESS)),
                        AbiValue::Uint(0),
                    ],
                })
            }
            other => Err(TransportError::Unsupported(format!("no view {}", other))),
        }
    }

    fn send(
        &self,
        sender: &Address,
        call: &ContractCall,
        options: &SendOptions,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();

        if let Some(reason) = state.revert_next.take() {
            return Err(TransportError::Reverted(reason));
        }

        let sender = sender.as_str().to_string();
        let value = u128::from(options.call_value);
        state.clock += 60;
        let now = state.clock;
        let rate = state.credits_per_trx;

        match call.method.as_str() {
            "stake" => {
                if value == 0 {
                    return Err(TransportError::Reverted("Must stake some TRX".into()));
                }
                let stake = state.stakes.entry(sender).or_default();
                stake.amount += value;
                stake.credits += value * rate / SUN_PER_TRX;
                stake.timestamp = now;
                Ok(())
            }
            "unstake" => {
                let amount = uint_arg(call, 0)?;
                let stake = state.stakes.entry(sender).or_default();
                if amount > stake.amount {
                    return Err(TransportError::Reverted("Insufficient staked amount".into()));
                }
                stake.amount -= amount;
                stake.credits = stake.credits.saturating_sub(amount * rate / SUN_PER_TRX);
                Ok(())
            }
            "purchasePack" => {
                let pack_id = uint_arg(call, 0)?;
                let price = *state
                    .catalog
                    .get(&pack_id)
                    .ok_or_else(|| TransportError::Reverted("Pack does not exist".into()))?;
                if value != price {
                    return Err(TransportError::Reverted("Incorrect payment amount".into()));
                }
                state.packs.entry(sender).or_default().push(pack_id);
                Ok(())
            }
            "mintNFT" => {
                let index = usize::try_from(uint_arg(call, 0)?)
                    .map_err(|_| TransportError::Reverted("Invalid pack index".into()))?;
                let cost = state.mint_cost;

                let credits = state.stakes.get(&sender).map(|s| s.credits).unwrap_or(0);
                if credits < cost {
                    return Err(TransportError::Reverted("Insufficient bandwidth credits".into()));
                }

                let owned = state.packs.entry(sender.clone()).or_default();
                if index >= owned.len() {
                    return Err(TransportError::Reverted("Invalid pack index".into()));
                }
                let pack_id = owned.remove(index);

                if let Some(stake) = state.stakes.get_mut(&sender) {
                    stake.credits -= cost;
                }

                let nft_id = state.next_nft_id;
                state.next_nft_id += 1;
                state.nft_records.insert(
                    nft_id,
                    NftRecord {
                        pack_id,
                        owner: sender.clone(),
                        minted_at: now,
                    },
                );
                state.nfts.entry(sender).or_default().push(nft_id);
                Ok(())
            }
            other => Err(TransportError::Unsupported(format!("no method {}", other))),
        }
    }
}

/// A wired-up client over the mock chain.
pub struct Harness {
    pub chain: MockChain,
    pub sim: PackContractSim,
    pub client: ActionClient,
    pub observed: Arc<Mutex<Vec<PendingAction>>>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_chain(MockChain::new().with_account(USER, SHASTA_HOST)).await
    }

    /// Build over `chain`; the contract simulation is installed on it.
    pub async fn with_chain(chain: MockChain) -> Self {
        let sim = PackContractSim::new();
        let chain = chain.with_handler(sim.clone());

        let transport: Arc<dyn ContractTransport> = Arc::new(chain.clone());
        let contract = ContractHandle::bind(transport, CONTRACT, BUNDLED_ABI)
            .await
            .expect("contract should bind");

        let session = Arc::new(WalletSession::new(Arc::new(chain.clone()), "shasta"));

        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);

        let client = ActionClient::builder()
            .session(session)
            .contract(contract)
            .confirmation(ConfirmationStrategy::Immediate)
            .observer(move |action: &PendingAction| sink.lock().unwrap().push(action.clone()))
            .build()
            .expect("client should build");

        Self {
            chain,
            sim,
            client,
            observed,
        }
    }

    /// Harness with the wallet connected and the first snapshot loaded.
    pub async fn connected() -> Self {
        let harness = Self::new().await;
        harness
            .client
            .connect()
            .await
            .expect("wallet should connect");
        harness.chain.clear_history();
        harness
    }

    pub fn observed(&self) -> Vec<PendingAction> {
        self.observed.lock().unwrap().clone()
    }
}
