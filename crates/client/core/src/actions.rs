//! Action client: stake, unstake, purchase a pack, mint an NFT.
//!
//! Every action runs the same pipeline:
//!
//! 1. validate input locally (nothing touches the network on bad input)
//! 2. convert TRX to sun and send through the wallet
//! 3. wait with the configured [`ConfirmationStrategy`]
//! 4. rebuild the snapshot from the contract
//!
//! The client never adjusts balances itself; what the caller sees after an
//! action is whatever the refresh read back. One action at a time is
//! assumed; concurrent actions are not serialized.
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{Address, TransactionId};

use crate::amount::TrxAmount;
use crate::config::AppConfig;
use crate::confirmation::{Confirmation, ConfirmationStrategy};
use crate::contract::ContractHandle;
use crate::error::{ClientError, Result};
use crate::pending::{ActionObserver, ActionParams, ActionStatus, PendingAction};
use crate::session::{Session, WalletSession};
use crate::snapshot::UserSnapshot;
use crate::sync::Synchronizer;

/// Outcome of a successful action.
#[derive(Debug, Clone)]
pub struct ActionReceipt {
    /// Final action record (status `Confirmed`)
    pub action: PendingAction,
    pub tx_hash: TransactionId,
    pub confirmation: Confirmation,
    /// Snapshot read after the action
    pub snapshot: UserSnapshot,
}

pub struct ActionClient {
    session: Arc<WalletSession>,
    contract: ContractHandle,
    synchronizer: Synchronizer,
    confirmation: ConfirmationStrategy,
    mint_cost: u128,
    observer: Option<Arc<dyn ActionObserver>>,
}

impl ActionClient {
    pub fn builder() -> ActionClientBuilder {
        ActionClientBuilder::new()
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn contract(&self) -> &ContractHandle {
        &self.contract
    }

    pub fn mint_cost(&self) -> u128 {
        self.mint_cost
    }

    /// Connect the wallet and load the account's state.
    ///
    /// A failed initial refresh is returned as an error, but the session
    /// stays connected so the caller can [`refresh`](Self::refresh) again.
    pub async fn connect(&self) -> Result<(Session, UserSnapshot)> {
        let session = self.session.connect().await?;
        let snapshot = self.synchronizer.refresh(&session.address).await?;
        Ok((session, snapshot))
    }

    pub async fn disconnect(&self) {
        self.session.disconnect().await;
        self.synchronizer.clear().await;
    }

    /// Last-known-good snapshot.
    pub async fn snapshot(&self) -> UserSnapshot {
        self.synchronizer.snapshot().await
    }

    /// Re-read the connected account's state.
    pub async fn refresh(&self) -> Result<UserSnapshot> {
        let address = self.session.address().await?;
        self.synchronizer.refresh(&address).await
    }

    /// Stake `amount` TRX, attached as call value.
    pub async fn stake(&self, amount: &str) -> Result<ActionReceipt> {
        let amount = TrxAmount::parse_positive(amount)?;
        let address = self.session.address().await?;

        let send = self.contract.stake(amount.sun());
        self.execute(address, ActionParams::Stake { amount }, send)
            .await
    }

    /// Unstake `amount` TRX.
    pub async fn unstake(&self, amount: &str) -> Result<ActionReceipt> {
        let amount = TrxAmount::parse_positive(amount)?;
        let address = self.session.address().await?;

        let send = self.contract.unstake(amount.sun());
        self.execute(address, ActionParams::Unstake { amount }, send)
            .await
    }

    /// Buy pack `pack_id`, paying `price` TRX.
    pub async fn purchase_pack(&self, pack_id: &str, price: &str) -> Result<ActionReceipt> {
        let id = parse_pack_id(pack_id)?;
        let price = TrxAmount::parse_positive(price)?;
        let address = self.session.address().await?;

        let send = self.contract.purchase_pack(id, price.sun());
        self.execute(
            address,
            ActionParams::PurchasePack {
                pack_id: id.to_string(),
                price,
            },
            send,
        )
        .await
    }

    /// Mint an NFT from the pack at `pack_index` in the snapshot's pack list.
    ///
    /// Blocked locally when the last snapshot shows fewer credits than the
    /// mint cost or no pack at that index. Passing the local check does not
    /// guarantee success; a contract revert is still reported.
    pub async fn mint_nft(&self, pack_index: usize) -> Result<ActionReceipt> {
        let address = self.session.address().await?;
        let snapshot = self.synchronizer.snapshot().await;

        let (credits, owned_packs) = if snapshot.address.as_ref() == Some(&address) {
            (snapshot.bandwidth_credits, snapshot.packs)
        } else {
            (0, Vec::new())
        };

        if credits < self.mint_cost {
            tracing::info!(
                "Mint blocked: {} credits, {} required",
                credits,
                self.mint_cost
            );
            return Err(ClientError::InsufficientCredits {
                available: credits,
                required: self.mint_cost,
            });
        }

        let position = owned_packs
            .get(pack_index)
            .and_then(|pack| pack.position)
            .ok_or_else(|| {
                ClientError::InvalidInput(format!(
                    "no owned pack at index {} ({} owned)",
                    pack_index,
                    owned_packs.len()
                ))
            })?;

        let send = self.contract.mint_nft(position as u128);
        self.execute(address, ActionParams::MintNft { pack_index }, send)
            .await
    }

    async fn execute<F>(
        &self,
        address: Address,
        params: ActionParams,
        send: F,
    ) -> Result<ActionReceipt>
    where
        F: Future<Output = Result<TransactionId>>,
    {
        let mut action = PendingAction::new(params);
        tracing::info!("Starting {} for {}", action.kind, address);
        self.notify(&action);

        action.advance(ActionStatus::AwaitingConfirmation);
        self.notify(&action);

        let tx_hash = match send.await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Err(self.abort(&mut action, e)),
        };
        action.tx_hash = Some(tx_hash.clone());
        self.notify(&action);

        let confirmation = match self
            .confirmation
            .wait(self.contract.transport(), &tx_hash)
            .await
        {
            Ok(confirmation) => confirmation,
            Err(e) => return Err(self.abort(&mut action, e)),
        };

        action.advance(ActionStatus::Confirmed);
        self.notify(&action);

        let snapshot = self
            .synchronizer
            .refresh(&address)
            .await
            .map_err(|e| ClientError::RefreshFailed {
                tx_hash: tx_hash.clone(),
                action: Box::new(action.clone()),
                source: Box::new(e),
            })?;

        tracing::info!("{} complete ({})", action.kind, tx_hash);

        Ok(ActionReceipt {
            action,
            tx_hash,
            confirmation,
            snapshot,
        })
    }

    fn abort(&self, action: &mut PendingAction, error: ClientError) -> ClientError {
        tracing::warn!("{} failed: {}", action.kind, error);
        action.fail(&error);
        self.notify(action);
        ClientError::ActionFailed {
            action: Box::new(action.clone()),
            source: Box::new(error),
        }
    }

    fn notify(&self, action: &PendingAction) {
        if let Some(observer) = &self.observer {
            observer.on_update(action);
        }
    }
}

/// Pack ids are positive decimal integers.
fn parse_pack_id(raw: &str) -> Result<u128> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::InvalidInput(format!(
            "pack id must be a decimal number, got {:?}",
            raw
        )));
    }

    match trimmed.parse::<u128>() {
        Ok(0) => Err(ClientError::InvalidInput("pack id must be positive".into())),
        Ok(id) => Ok(id),
        Err(_) => Err(ClientError::InvalidInput(format!(
            "pack id out of range: {}",
            trimmed
        ))),
    }
}

/// Builder for [`ActionClient`].
///
/// The session and contract are required; everything else has defaults
/// (catalog `[1, 2, 3]`, mint cost 5, fixed 2 s settle delay).
///
/// A strategy set with [`confirmation`](Self::confirmation) wins over the
/// settle delay from [`config`](Self::config), in either call order.
pub struct ActionClientBuilder {
    session: Option<Arc<WalletSession>>,
    contract: Option<ContractHandle>,
    catalog_ids: Vec<u128>,
    mint_cost: u128,
    confirmation: Option<ConfirmationStrategy>,
    settle_delay: Option<Duration>,
    fee_limit: Option<u64>,
    observer: Option<Arc<dyn ActionObserver>>,
}

impl Default for ActionClientBuilder {
    fn default() -> Self {
        Self {
            session: None,
            contract: None,
            catalog_ids: vec![1, 2, 3],
            mint_cost: 5,
            confirmation: None,
            settle_delay: None,
            fee_limit: None,
            observer: None,
        }
    }
}

impl ActionClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply catalog, mint cost, settle delay and fee limit from `config`.
    pub fn config(mut self, config: &AppConfig) -> Self {
        self.catalog_ids = config.sync.catalog_ids.clone();
        self.mint_cost = config.economics.mint_cost;
        self.settle_delay = Some(config.tx.settle_delay);
        self.fee_limit = Some(config.tx.fee_limit);
        self
    }

    pub fn session(mut self, session: Arc<WalletSession>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn contract(mut self, contract: ContractHandle) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn catalog_ids(mut self, ids: Vec<u128>) -> Self {
        self.catalog_ids = ids;
        self
    }

    pub fn mint_cost(mut self, cost: u128) -> Self {
        self.mint_cost = cost;
        self
    }

    pub fn confirmation(mut self, strategy: ConfirmationStrategy) -> Self {
        self.confirmation = Some(strategy);
        self
    }

    pub fn observer(mut self, observer: impl ActionObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Build the client. The contract handle is given the session's wallet
    /// as its signer.
    pub fn build(self) -> Result<ActionClient> {
        let session = self.session.ok_or_else(|| {
            ClientError::Config("wallet session is required; use .session()".into())
        })?;
        let contract = self.contract.ok_or_else(|| {
            ClientError::Config("contract handle is required; use .contract()".into())
        })?;

        let mut contract = contract.with_wallet(session.wallet());
        if let Some(fee_limit) = self.fee_limit {
            contract = contract.with_fee_limit(fee_limit);
        }
        let synchronizer = Synchronizer::new(contract.clone(), self.catalog_ids);

        let confirmation = match (self.confirmation, self.settle_delay) {
            (Some(strategy), _) => strategy,
            (None, Some(delay)) => ConfirmationStrategy::FixedDelay(delay),
            (None, None) => ConfirmationStrategy::default(),
        };

        Ok(ActionClient {
            session,
            contract,
            synchronizer,
            confirmation,
            mint_cost: self.mint_cost,
            observer: self.observer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_ids_must_be_positive_decimals() {
        assert_eq!(parse_pack_id(" 2 ").unwrap(), 2);
        for raw in ["", "0", "-1", "1.5", "abc", "0x01", "999999999999999999999999999999999999999999"] {
            assert!(
                matches!(parse_pack_id(raw), Err(ClientError::InvalidInput(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    async fn build_with(
        configure: impl FnOnce(ActionClientBuilder) -> ActionClientBuilder,
    ) -> ActionClient {
        use client_blockchain_core::{ContractTransport, MockChain};

        use crate::config::BUNDLED_ABI;

        let chain = MockChain::new();
        let transport: Arc<dyn ContractTransport> = Arc::new(chain.clone());
        let contract = ContractHandle::bind(transport, "TPackContract", BUNDLED_ABI)
            .await
            .unwrap();
        let session = Arc::new(WalletSession::new(Arc::new(chain), "shasta"));

        configure(ActionClient::builder().session(session).contract(contract))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn explicit_confirmation_wins_over_config() {
        let mut config = AppConfig::new("TPackContract");
        config.tx.settle_delay = Duration::from_millis(750);

        let immediate = ConfirmationStrategy::Immediate;

        let before = build_with(|b| b.confirmation(immediate).config(&config)).await;
        assert_eq!(before.confirmation, immediate);

        let after = build_with(|b| b.config(&config).confirmation(immediate)).await;
        assert_eq!(after.confirmation, immediate);

        let from_config = build_with(|b| b.config(&config)).await;
        assert_eq!(
            from_config.confirmation,
            ConfirmationStrategy::FixedDelay(Duration::from_millis(750))
        );
    }

    #[test]
    fn builder_requires_session_and_contract() {
        let err = ActionClient::builder().build().err().unwrap();
        assert!(matches!(err, ClientError::Config(msg) if msg.contains("session")));
    }
}
