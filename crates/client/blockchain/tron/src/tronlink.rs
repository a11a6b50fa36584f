//! TronLink browser wallet bridge (wasm32 only).
//!
//! Talks to the objects the extension injects into the page
//! (`window.tronLink`, `tronLink.tronWeb`) through `js_sys::Reflect`. No JS
//! handle is cached: every call re-reads the globals, so the wallet type
//! stays `Send + Sync` and picks up account or network switches.

use async_trait::async_trait;
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use client_blockchain_core::{
    AbiValue, AccountDescriptor, AccountRequestStatus, Address, ContractCall, NetworkDescriptor,
    SendOptions, TransactionId, TransportError, WalletProvider,
};

/// Largest integer a JS number represents exactly.
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Wallet backed by the TronLink extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct TronLinkWallet;

impl TronLinkWallet {
    pub fn new() -> Self {
        Self
    }
}

fn window() -> Result<JsValue, TransportError> {
    web_sys::window()
        .map(JsValue::from)
        .ok_or_else(|| TransportError::Unsupported("not running in a browser window".into()))
}

fn get(target: &JsValue, key: &str) -> Result<JsValue, TransportError> {
    Reflect::get(target, &JsValue::from_str(key))
        .map_err(|e| TransportError::Backend(format!("failed to read {}: {}", key, js_message(&e))))
}

fn is_missing(value: &JsValue) -> bool {
    value.is_falsy()
}

fn tron_link() -> Result<JsValue, TransportError> {
    let link = get(&window()?, "tronLink")?;
    if is_missing(&link) {
        return Err(TransportError::Unsupported("TronLink not installed".into()));
    }
    Ok(link)
}

fn tron_web() -> Result<JsValue, TransportError> {
    let injected = get(&tron_link()?, "tronWeb")?;
    let tron_web = if is_missing(&injected) {
        get(&window()?, "tronWeb")?
    } else {
        injected
    };

    if is_missing(&tron_web) {
        return Err(TransportError::Backend("TronWeb not initialized".into()));
    }
    Ok(tron_web)
}

fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// TronLink reports a declined prompt as a plain error string.
fn map_js_error(value: JsValue) -> TransportError {
    let message = js_message(&value);
    let lowered = message.to_lowercase();
    if lowered.contains("declined") || lowered.contains("rejected") || lowered.contains("cancel") {
        TransportError::Rejected(message)
    } else {
        TransportError::Backend(message)
    }
}

/// Call `target[method](...args)`, awaiting the result if it is a promise.
async fn invoke(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, TransportError> {
    let function: Function = get(target, method)?
        .dyn_into()
        .map_err(|_| TransportError::Backend(format!("{} is not a function", method)))?;

    let result = function
        .apply(target, &args.iter().collect::<Array>())
        .map_err(map_js_error)?;

    match result.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await.map_err(map_js_error),
        Err(value) => Ok(value),
    }
}

fn object(entries: &[(&str, JsValue)]) -> Result<JsValue, TransportError> {
    let obj = Object::new();
    for (key, value) in entries {
        Reflect::set(&obj, &JsValue::from_str(key), value)
            .map_err(|e| TransportError::Backend(js_message(&e)))?;
    }
    Ok(obj.into())
}

fn safe_number(value: u64, what: &str) -> Result<JsValue, TransportError> {
    if value > MAX_SAFE_INTEGER {
        return Err(TransportError::Unsupported(format!(
            "{} {} exceeds the wallet's numeric range",
            what, value
        )));
    }
    Ok(JsValue::from_f64(value as f64))
}

/// Parameter types listed in a canonical signature, e.g. `f(uint256,address)`.
fn input_types(signature: &str) -> Vec<&str> {
    signature
        .split_once('(')
        .and_then(|(_, rest)| rest.strip_suffix(')'))
        .map(|list| list.split(',').filter(|t| !t.is_empty()).collect())
        .unwrap_or_default()
}

fn to_parameter(ty: &str, value: &AbiValue) -> Result<JsValue, TransportError> {
    let js_value = match value {
        AbiValue::Uint(v) => JsValue::from_str(&v.to_string()),
        AbiValue::Address(address) => JsValue::from_str(address.as_str()),
        AbiValue::Bool(b) => JsValue::from_bool(*b),
        AbiValue::Array(_) => {
            return Err(TransportError::Unsupported(
                "array arguments are not supported".into(),
            ));
        }
    };
    object(&[("type", JsValue::from_str(ty)), ("value", js_value)])
}

fn default_address(tron_web: &JsValue) -> Result<String, TransportError> {
    get(&get(tron_web, "defaultAddress")?, "base58")?
        .as_string()
        .ok_or_else(|| TransportError::Backend("wallet is locked or has no account selected".into()))
}

#[async_trait(?Send)]
impl WalletProvider for TronLinkWallet {
    fn is_present(&self) -> bool {
        tron_link().is_ok()
    }

    async fn request_accounts(&self) -> Result<AccountRequestStatus, TransportError> {
        let link = tron_link()?;
        let request = object(&[("method", JsValue::from_str("tron_requestAccounts"))])?;

        let response = invoke(&link, "request", &[request]).await?;
        let code = if is_missing(&response) {
            0
        } else {
            get(&response, "code")?.as_f64().unwrap_or(0.0) as u16
        };

        tracing::debug!("tron_requestAccounts returned code {}", code);
        Ok(AccountRequestStatus(code))
    }

    async fn account(&self) -> Result<AccountDescriptor, TransportError> {
        let tron_web = tron_web()?;
        let address = default_address(&tron_web)?;
        let host = get(&get(&tron_web, "fullNode")?, "host")?
            .as_string()
            .unwrap_or_default();

        Ok(AccountDescriptor {
            address: Address::new_unchecked(address),
            network: NetworkDescriptor::new(host),
        })
    }

    async fn send(
        &self,
        call: &ContractCall,
        options: &SendOptions,
    ) -> Result<TransactionId, TransportError> {
        let tron_web = tron_web()?;
        let issuer = default_address(&tron_web)?;

        let types = input_types(&call.signature);
        if types.len() != call.args.len() {
            return Err(TransportError::Config(format!(
                "{} takes {} arguments, got {}",
                call.signature,
                types.len(),
                call.args.len()
            )));
        }
        let parameters = types
            .iter()
            .zip(&call.args)
            .map(|(ty, value)| to_parameter(ty, value))
            .collect::<Result<Array, _>>()?;

        let trigger_options = object(&[
            ("callValue", safe_number(options.call_value, "call value")?),
            ("feeLimit", safe_number(options.fee_limit, "fee limit")?),
        ])?;

        tracing::debug!(
            "Building {} (call_value={}, fee_limit={})",
            call.signature,
            options.call_value,
            options.fee_limit
        );

        let builder = get(&tron_web, "transactionBuilder")?;
        let built = invoke(
            &builder,
            "triggerSmartContract",
            &[
                JsValue::from_str(call.contract.as_str()),
                JsValue::from_str(&call.signature),
                trigger_options,
                parameters.into(),
                JsValue::from_str(&issuer),
            ],
        )
        .await?;

        if get(&get(&built, "result")?, "result")?.as_bool() != Some(true) {
            let message = get(&get(&built, "result")?, "message")?
                .as_string()
                .unwrap_or_else(|| "transaction could not be built".into());
            return Err(TransportError::Backend(message));
        }

        let trx = get(&tron_web, "trx")?;
        let signed = invoke(&trx, "sign", &[get(&built, "transaction")?]).await?;
        let broadcast = invoke(&trx, "sendRawTransaction", &[signed.clone()]).await?;

        if get(&broadcast, "result")?.as_bool() != Some(true) {
            let code = get(&broadcast, "code")?.as_string().unwrap_or_default();
            let message = get(&broadcast, "message")?.as_string().unwrap_or_default();
            let message = hex::decode(&message)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .unwrap_or(message);
            return Err(TransportError::Backend(format!("broadcast failed {}: {}", code, message)));
        }

        let tx_id = get(&broadcast, "txid")?
            .as_string()
            .or_else(|| get(&signed, "txID").ok().and_then(|v| v.as_string()))
            .ok_or_else(|| TransportError::Decode("broadcast returned no transaction id".into()))?;

        tracing::info!("Broadcast {} as {}", call.method, tx_id);
        Ok(TransactionId::new(tx_id))
    }
}
