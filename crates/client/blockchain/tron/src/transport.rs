//! TronGrid full-node HTTP transport.
//!
//! Reads go through `/wallet/triggerconstantcontract`, which executes a view
//! method without creating a transaction, so no key is ever involved.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use client_blockchain_core::{
    AbiValue, Address, BlockchainConfig, ContractCall, ContractTransport, TransactionId,
    TransactionStatus, TransportError,
};

use crate::abi;
use crate::address::TronAddress;
use crate::config::TronConfig;

/// `Error(string)` selector prefixed to Solidity revert data.
const ERROR_SELECTOR: &str = "08c379a0";

#[derive(Debug, Serialize)]
struct TriggerConstantRequest<'a> {
    owner_address: &'a str,
    contract_address: &'a str,
    function_selector: &'a str,
    parameter: String,
    visible: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ReturnStatus {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TriggerConstantResponse {
    #[serde(default)]
    result: ReturnStatus,
    #[serde(default)]
    constant_result: Vec<String>,
}

#[derive(Debug, Serialize)]
struct TransactionInfoRequest<'a> {
    value: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct TransactionInfoResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "blockNumber", default)]
    block_number: Option<u64>,
    #[serde(default)]
    receipt: Option<Receipt>,
    #[serde(default)]
    result: Option<String>,
    #[serde(rename = "resMessage", default)]
    res_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Receipt {
    #[serde(default)]
    result: Option<String>,
}

/// TronGrid-backed [`ContractTransport`].
pub struct TronGridTransport {
    config: TronConfig,
    http_client: reqwest::Client,
}

impl TronGridTransport {
    /// Create a transport for the configured network.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: TronConfig) -> Result<Self, TransportError> {
        config.validate().map_err(TransportError::Config)?;

        Ok(Self {
            config,
            http_client: reqwest::Client::new(),
        })
    }

    pub fn config(&self) -> &TronConfig {
        &self.config
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.get_rpc_url(), path);
        tracing::debug!("POST {}", url);

        let mut request = self.http_client.post(&url).json(body);
        if let Some(ref key) = self.config.api_key {
            request = request.header("TRON-PRO-API-KEY", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(TransportError::Network(format!(
                "{} returned status {}: {}",
                path, status, text
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            TransportError::Decode(format!("unexpected response from {}: {} ({})", path, e, text))
        })
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ContractTransport for TronGridTransport {
    fn parse_address(&self, raw: &str) -> Result<Address, TransportError> {
        let address = TronAddress::from_base58(raw)
            .or_else(|_| TronAddress::from_hex(raw))
            .map_err(|e| TransportError::Config(format!("malformed address {:?}: {}", raw, e)))?;
        Ok(Address::new_unchecked(address.to_base58()))
    }

    async fn call(&self, call: &ContractCall) -> Result<Vec<AbiValue>, TransportError> {
        let request = TriggerConstantRequest {
            owner_address: call.contract.as_str(),
            contract_address: call.contract.as_str(),
            function_selector: &call.signature,
            parameter: abi::encode_params(&call.args)?,
            visible: true,
        };

        let response: TriggerConstantResponse = self
            .post("/wallet/triggerconstantcontract", &request)
            .await?;

        if !response.result.result {
            let code = response.result.code.unwrap_or_else(|| "UNKNOWN".into());
            let message = response
                .result
                .message
                .as_deref()
                .map(decode_node_message)
                .unwrap_or_default();
            return Err(TransportError::Backend(format!("{}: {}", code, message)));
        }

        let raw = response
            .constant_result
            .first()
            .ok_or_else(|| TransportError::Decode(format!("{} returned no result", call.method)))?;

        if let Some(reason) = raw.strip_prefix(ERROR_SELECTOR) {
            return Err(TransportError::Reverted(decode_revert_reason(reason)));
        }

        let data = hex::decode(raw)
            .map_err(|e| TransportError::Decode(format!("invalid hex result: {}", e)))?;

        abi::decode_outputs(&call.outputs, &data)
    }

    async fn query_transaction(
        &self,
        tx_id: &TransactionId,
    ) -> Result<TransactionStatus, TransportError> {
        let info: TransactionInfoResponse = self
            .post(
                "/wallet/gettransactioninfobyid",
                &TransactionInfoRequest {
                    value: tx_id.as_str(),
                },
            )
            .await?;

        Ok(interpret_transaction_info(info))
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        let _: serde_json::Value = self.post("/wallet/getnowblock", &serde_json::json!({})).await?;
        Ok(())
    }
}

fn interpret_transaction_info(info: TransactionInfoResponse) -> TransactionStatus {
    let Some(block_height) = info.block_number.filter(|_| info.id.is_some()) else {
        return TransactionStatus::Pending;
    };

    let receipt_result = info.receipt.and_then(|r| r.result);
    let failed = info.result.as_deref() == Some("FAILED")
        || receipt_result.as_deref().is_some_and(|r| r != "SUCCESS");

    if failed {
        let error = info
            .res_message
            .as_deref()
            .map(decode_node_message)
            .filter(|m| !m.is_empty())
            .or(receipt_result)
            .unwrap_or_else(|| "transaction failed".to_string());
        TransactionStatus::Failed { error }
    } else {
        TransactionStatus::Confirmed { block_height }
    }
}

/// Node messages are usually hex-encoded UTF-8; fall back to the raw text.
fn decode_node_message(message: &str) -> String {
    hex::decode(message)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| message.to_string())
}

/// Decode the `string` payload of `Error(string)` revert data (selector stripped).
fn decode_revert_reason(data: &str) -> String {
    let decoded = hex::decode(data).ok().and_then(|bytes| {
        let len_word = bytes.get(32..64)?;
        let len = usize::try_from(u128::from_be_bytes(len_word[16..].try_into().ok()?)).ok()?;
        let end = 64usize.checked_add(len)?;
        let text = bytes.get(64..end)?;
        String::from_utf8(text.to_vec()).ok()
    });

    decoded.unwrap_or_else(|| "execution reverted".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_hex_node_messages() {
        assert_eq!(decode_node_message("4f7574206f6620656e65726779"), "Out of energy");
        assert_eq!(decode_node_message("plain text"), "plain text");
    }

    #[test]
    fn decodes_revert_reason() {
        let reason = "Insufficient credits";
        let data = format!(
            "{:064x}{:064x}{:0<128}",
            32,
            reason.len(),
            hex::encode(reason)
        );
        assert_eq!(decode_revert_reason(&data), reason);
        assert_eq!(decode_revert_reason("zz"), "execution reverted");
    }

    #[test]
    fn malformed_revert_payloads_fall_back() {
        let fallback = "execution reverted";

        // Length word claims more bytes than the payload holds
        let truncated = format!("{:064x}{:064x}{}", 32, 40, hex::encode("short"));
        assert_eq!(decode_revert_reason(&truncated), fallback);

        // Length word near usize::MAX
        let huge = format!("{:064x}{:064x}", 32, u64::MAX as u128);
        assert_eq!(decode_revert_reason(&huge), fallback);
        let max = format!("{:064x}{:064x}", 32, u128::MAX);
        assert_eq!(decode_revert_reason(&max), fallback);

        // Missing length word, and a reason that is not UTF-8
        assert_eq!(decode_revert_reason(&format!("{:064x}", 32)), fallback);
        let invalid = format!("{:064x}{:064x}{:0<64}", 32, 2, "fffe");
        assert_eq!(decode_revert_reason(&invalid), fallback);
        assert_eq!(decode_revert_reason(""), fallback);
    }

    #[test]
    fn transaction_info_mapping() {
        assert_eq!(
            interpret_transaction_info(TransactionInfoResponse::default()),
            TransactionStatus::Pending
        );

        let confirmed = TransactionInfoResponse {
            id: Some("ab".into()),
            block_number: Some(42),
            receipt: Some(Receipt {
                result: Some("SUCCESS".into()),
            }),
            ..Default::default()
        };
        assert_eq!(
            interpret_transaction_info(confirmed),
            TransactionStatus::Confirmed { block_height: 42 }
        );

        let reverted = TransactionInfoResponse {
            id: Some("ab".into()),
            block_number: Some(43),
            receipt: Some(Receipt {
                result: Some("REVERT".into()),
            }),
            result: Some("FAILED".into()),
            res_message: Some(hex::encode("REVERT opcode executed")),
        };
        assert_eq!(
            interpret_transaction_info(reverted),
            TransactionStatus::Failed {
                error: "REVERT opcode executed".into()
            }
        );
    }

    #[test]
    fn parse_address_accepts_base58_and_hex() {
        let transport = TronGridTransport::new(TronConfig::default()).unwrap();
        let base58 = transport
            .parse_address("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t")
            .unwrap();
        let hex = transport
            .parse_address("41a614f803b6fd780986a42c78ec9c7f77e6ded13c")
            .unwrap();
        assert_eq!(base58, hex);
        assert!(transport.parse_address("T123").is_err());
    }
}
