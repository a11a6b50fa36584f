//! Mock chain for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::traits::{ContractTransport, TransportError, WalletProvider};
use crate::types::{
    AbiValue, AccountDescriptor, AccountRequestStatus, Address, ContractCall, NetworkDescriptor,
    SendOptions, TransactionId, TransactionStatus,
};

/// Contract behaviour plugged into a [`MockChain`].
///
/// `send` mutates contract state; returning an error simulates a revert.
pub trait ContractHandler: Send + Sync {
    fn call(&self, call: &ContractCall) -> Result<Vec<AbiValue>, TransportError>;

    fn send(
        &self,
        sender: &Address,
        call: &ContractCall,
        options: &SendOptions,
    ) -> Result<(), TransportError>;
}

/// A send that reached the mock wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSend {
    pub call: ContractCall,
    pub options: SendOptions,
    pub tx_id: TransactionId,
}

struct MockState {
    wallet_present: bool,
    request_status: AccountRequestStatus,
    account: Option<AccountDescriptor>,
    healthy: bool,
    handler: Option<Arc<dyn ContractHandler>>,
    calls: Vec<ContractCall>,
    sends: Vec<RecordedSend>,
    receipts: HashMap<TransactionId, TransactionStatus>,
    tx_counter: u64,
}

/// In-memory node + wallet for testing without network.
///
/// Implements both [`ContractTransport`] and [`WalletProvider`] and records
/// every call and send it sees.
#[derive(Clone)]
pub struct MockChain {
    state: Arc<Mutex<MockState>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                wallet_present: true,
                request_status: AccountRequestStatus::GRANTED,
                account: None,
                healthy: true,
                handler: None,
                calls: Vec::new(),
                sends: Vec::new(),
                receipts: HashMap::new(),
                tx_counter: 0,
            })),
        }
    }

    /// Set the wallet's active account and network host.
    pub fn with_account(self, address: &str, host: &str) -> Self {
        self.state.lock().unwrap().account = Some(AccountDescriptor {
            address: Address::new_unchecked(address),
            network: NetworkDescriptor::new(host),
        });
        self
    }

    pub fn with_handler(self, handler: impl ContractHandler + 'static) -> Self {
        self.state.lock().unwrap().handler = Some(Arc::new(handler));
        self
    }

    /// Simulate a missing wallet extension.
    pub fn without_wallet(self) -> Self {
        self.state.lock().unwrap().wallet_present = false;
        self
    }

    /// Answer account requests with the given status code.
    pub fn with_request_status(self, code: u16) -> Self {
        self.state.lock().unwrap().request_status = AccountRequestStatus(code);
        self
    }

    /// Make the health check fail (node unreachable).
    pub fn unreachable(self) -> Self {
        self.state.lock().unwrap().healthy = false;
        self
    }

    /// Override the receipt reported for a transaction.
    pub fn set_receipt(&self, tx_id: &TransactionId, status: TransactionStatus) {
        self.state
            .lock()
            .unwrap()
            .receipts
            .insert(tx_id.clone(), status);
    }

    /// Constant calls seen so far, in order.
    pub fn calls(&self) -> Vec<ContractCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of constant calls to `method`.
    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Sends seen so far, in order.
    pub fn sends(&self) -> Vec<RecordedSend> {
        self.state.lock().unwrap().sends.clone()
    }

    pub fn clear_history(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.clear();
        state.sends.clear();
    }

    fn handler(&self) -> Result<Arc<dyn ContractHandler>, TransportError> {
        self.state
            .lock()
            .unwrap()
            .handler
            .clone()
            .ok_or_else(|| TransportError::Config("no contract deployed on mock chain".into()))
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ContractTransport for MockChain {
    fn parse_address(&self, raw: &str) -> Result<Address, TransportError> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TransportError::Config(format!("malformed address: {:?}", raw)));
        }
        Ok(Address::new_unchecked(raw))
    }

    async fn call(&self, call: &ContractCall) -> Result<Vec<AbiValue>, TransportError> {
        let handler = self.handler()?;
        self.state.lock().unwrap().calls.push(call.clone());
        handler.call(call)
    }

    async fn query_transaction(
        &self,
        tx_id: &TransactionId,
    ) -> Result<TransactionStatus, TransportError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .receipts
            .get(tx_id)
            .cloned()
            .unwrap_or(TransactionStatus::Pending))
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        if self.state.lock().unwrap().healthy {
            Ok(())
        } else {
            Err(TransportError::Network("mock node unreachable".into()))
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl WalletProvider for MockChain {
    fn is_present(&self) -> bool {
        self.state.lock().unwrap().wallet_present
    }

    async fn request_accounts(&self) -> Result<AccountRequestStatus, TransportError> {
        Ok(self.state.lock().unwrap().request_status)
    }

    async fn account(&self) -> Result<AccountDescriptor, TransportError> {
        self.state
            .lock()
            .unwrap()
            .account
            .clone()
            .ok_or_else(|| TransportError::Backend("wallet has no active account".into()))
    }

    async fn send(
        &self,
        call: &ContractCall,
        options: &SendOptions,
    ) -> Result<TransactionId, TransportError> {
        let handler = self.handler()?;
        let sender = self.account().await?.address;

        handler.send(&sender, call, options)?;

        let mut state = self.state.lock().unwrap();
        state.tx_counter += 1;
        let counter = state.tx_counter;
        let tx_id = TransactionId::new(format!("{:064x}", counter));
        state.receipts.insert(
            tx_id.clone(),
            TransactionStatus::Confirmed {
                block_height: counter,
            },
        );
        state.sends.push(RecordedSend {
            call: call.clone(),
            options: *options,
            tx_id: tx_id.clone(),
        });

        tracing::debug!(method = %call.method, tx = %tx_id, "mock send accepted");
        Ok(tx_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl ContractHandler for Echo {
        fn call(&self, call: &ContractCall) -> Result<Vec<AbiValue>, TransportError> {
            Ok(call.args.clone())
        }

        fn send(
            &self,
            _sender: &Address,
            call: &ContractCall,
            _options: &SendOptions,
        ) -> Result<(), TransportError> {
            if call.method == "boom" {
                return Err(TransportError::Reverted("boom".into()));
            }
            Ok(())
        }
    }

    fn call(method: &str) -> ContractCall {
        ContractCall {
            contract: Address::new_unchecked("TContract"),
            method: method.into(),
            signature: format!("{}()", method),
            args: vec![AbiValue::Uint(7)],
            outputs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_mock_chain_records_calls_and_sends() {
        let chain = MockChain::new()
            .with_account("TUser", "https://api.shasta.trongrid.io")
            .with_handler(Echo);

        let out = chain.call(&call("echo")).await.unwrap();
        assert_eq!(out, vec![AbiValue::Uint(7)]);
        assert_eq!(chain.call_count("echo"), 1);

        let options = SendOptions {
            call_value: 5,
            fee_limit: 10,
        };
        let tx = chain.send(&call("poke"), &options).await.unwrap();
        assert_eq!(chain.sends().len(), 1);
        assert_eq!(chain.sends()[0].options, options);
        assert_eq!(
            chain.query_transaction(&tx).await.unwrap(),
            TransactionStatus::Confirmed { block_height: 1 }
        );

        let err = chain.send(&call("boom"), &options).await.unwrap_err();
        assert_eq!(err, TransportError::Reverted("boom".into()));
        assert_eq!(chain.sends().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_wallet_configuration() {
        let chain = MockChain::new().without_wallet().with_request_status(4001);
        assert!(!chain.is_present());
        assert!(!chain.request_accounts().await.unwrap().is_granted());
        assert!(chain.account().await.is_err());

        let chain = MockChain::new().unreachable();
        assert!(chain.health_check().await.is_err());
        assert!(chain.parse_address("not valid!").is_err());
    }
}
