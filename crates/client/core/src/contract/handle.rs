use std::sync::Arc;

use client_blockchain_core::{
    AbiValue, Address, ContractCall, ContractTransport, SendOptions, TransactionId, WalletProvider,
};

use super::interface::{ContractInterface, MethodSpec};
use crate::error::{ClientError, Result};

pub const DEFAULT_FEE_LIMIT: u64 = 1_000_000_000;

/// A deployed contract bound to its interface.
///
/// Constant calls go to the [`ContractTransport`]; sends go to the
/// [`WalletProvider`], which signs and broadcasts. A handle without a wallet
/// can read but not send.
#[derive(Clone)]
pub struct ContractHandle {
    address: Address,
    interface: Arc<ContractInterface>,
    transport: Arc<dyn ContractTransport>,
    wallet: Option<Arc<dyn WalletProvider>>,
    fee_limit: u64,
}

impl ContractHandle {
    /// Bind `address` with the ABI in `abi_json`.
    ///
    /// Fails with [`ClientError::Bind`] when the address is malformed, the
    /// ABI is unusable, or the node does not answer a health check.
    pub async fn bind(
        transport: Arc<dyn ContractTransport>,
        address: &str,
        abi_json: &str,
    ) -> Result<Self> {
        let address = transport
            .parse_address(address)
            .map_err(|e| ClientError::Bind(e.to_string()))?;

        let interface = ContractInterface::from_json(abi_json)?;

        transport
            .health_check()
            .await
            .map_err(|e| ClientError::Bind(format!("node unreachable: {}", e)))?;

        tracing::info!(
            "Bound contract {} ({} methods)",
            address,
            interface.len()
        );

        Ok(Self {
            address,
            interface: Arc::new(interface),
            transport,
            wallet: None,
            fee_limit: DEFAULT_FEE_LIMIT,
        })
    }

    /// Attach the wallet that signs sends.
    pub fn with_wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn with_fee_limit(mut self, fee_limit: u64) -> Self {
        self.fee_limit = fee_limit;
        self
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn interface(&self) -> &ContractInterface {
        &self.interface
    }

    pub fn transport(&self) -> &dyn ContractTransport {
        self.transport.as_ref()
    }

    pub fn fee_limit(&self) -> u64 {
        self.fee_limit
    }

    /// Validate and normalize an account address with the node's codec.
    pub fn parse_address(&self, raw: &str) -> Result<Address> {
        self.transport
            .parse_address(raw)
            .map_err(|e| ClientError::InvalidInput(e.to_string()))
    }

    /// Read-only call. Never creates or signs a transaction.
    pub async fn call(&self, method: &str, args: Vec<AbiValue>) -> Result<Vec<AbiValue>> {
        let spec = self.interface.require(method)?;
        if !spec.mutability.is_read_only() {
            return Err(ClientError::InvalidInput(format!(
                "{} changes state; use send",
                method
            )));
        }

        let call = self.prepare(spec, args)?;
        tracing::debug!("call {}", call.signature);

        let outputs = self
            .transport
            .call(&call)
            .await
            .map_err(|e| ClientError::from_read(method, e))?;

        if outputs.len() != spec.outputs.len() {
            return Err(ClientError::ReadFailure {
                method: method.to_string(),
                message: format!(
                    "expected {} output(s), got {}",
                    spec.outputs.len(),
                    outputs.len()
                ),
            });
        }

        Ok(outputs)
    }

    /// Send options carrying `call_value` sun and the handle's fee limit.
    pub fn options(&self, call_value: u64) -> SendOptions {
        SendOptions {
            call_value,
            fee_limit: self.fee_limit,
        }
    }

    /// State-mutating call, signed and broadcast by the wallet.
    pub async fn send(
        &self,
        method: &str,
        args: Vec<AbiValue>,
        options: SendOptions,
    ) -> Result<TransactionId> {
        let spec = self.interface.require(method)?;
        if spec.mutability.is_read_only() {
            return Err(ClientError::InvalidInput(format!(
                "{} is read-only; use call",
                method
            )));
        }
        if options.call_value > 0 && !spec.is_payable() {
            return Err(ClientError::InvalidInput(format!(
                "{} does not accept a call value",
                method
            )));
        }

        let call = self.prepare(spec, args)?;

        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| ClientError::Connection("no wallet available to sign".into()))?;

        tracing::debug!(
            "send {} (call_value={}, fee_limit={})",
            call.signature,
            options.call_value,
            options.fee_limit
        );

        let tx_id = wallet
            .send(&call, &options)
            .await
            .map_err(ClientError::from_send)?;

        tracing::info!("{} broadcast as {}", method, tx_id);
        Ok(tx_id)
    }

    fn prepare(&self, spec: &MethodSpec, args: Vec<AbiValue>) -> Result<ContractCall> {
        spec.check_args(&args)?;

        Ok(ContractCall {
            contract: self.address.clone(),
            method: spec.name.clone(),
            signature: spec.signature(),
            args,
            outputs: spec.outputs.clone(),
        })
    }
}
