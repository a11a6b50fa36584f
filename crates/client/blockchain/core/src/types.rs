//! Common types for contract interactions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account or contract address in the backend's human-readable encoding.
///
/// Each blockchain uses its own format:
/// - TRON: Base58Check string (`T...`, 34 characters)
/// - Ethereum: 0x-prefixed hex (20 bytes)
///
/// Construct through [`crate::ContractTransport::parse_address`] so the
/// backend can validate it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an already validated address string.
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction identifier returned by a broadcast (hex digest).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction status on the blockchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Transaction is not yet part of a block (or unknown to the node)
    Pending,

    /// Transaction is confirmed on-chain
    Confirmed { block_height: u64 },

    /// Transaction failed on-chain
    Failed { error: String },
}

/// Network the wallet is currently pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// Full-node host reported by the wallet (e.g. `https://api.shasta.trongrid.io`)
    pub host: String,
}

impl NetworkDescriptor {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Whether this network matches a configured network identifier.
    ///
    /// Matching is a case-insensitive substring test against the host,
    /// so `shasta` matches `https://api.shasta.trongrid.io`.
    pub fn matches(&self, identifier: &str) -> bool {
        !identifier.is_empty()
            && self
                .host
                .to_ascii_lowercase()
                .contains(&identifier.to_ascii_lowercase())
    }
}

/// Active account exposed by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDescriptor {
    pub address: Address,
    pub network: NetworkDescriptor,
}

/// Status code returned by a wallet's account-access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequestStatus(pub u16);

impl AccountRequestStatus {
    pub const GRANTED: Self = Self(200);

    pub fn is_granted(&self) -> bool {
        *self == Self::GRANTED
    }
}

/// Subset of Solidity ABI types understood by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbiType {
    /// `uintN`, width in bits
    Uint(u16),
    Address,
    Bool,
    /// Dynamic array `T[]`
    Array(Box<AbiType>),
}

impl AbiType {
    /// Whether `value` can be encoded as this type.
    pub fn accepts(&self, value: &AbiValue) -> bool {
        match (self, value) {
            (AbiType::Uint(bits), AbiValue::Uint(v)) => *bits >= 128 || *v >> *bits == 0,
            (AbiType::Address, AbiValue::Address(_)) => true,
            (AbiType::Bool, AbiValue::Bool(_)) => true,
            (AbiType::Array(inner), AbiValue::Array(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            _ => false,
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

impl FromStr for AbiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_suffix("[]") {
            return Ok(AbiType::Array(Box::new(inner.parse()?)));
        }

        match s {
            "address" => Ok(AbiType::Address),
            "bool" => Ok(AbiType::Bool),
            "uint" => Ok(AbiType::Uint(256)),
            other => {
                let bits = other
                    .strip_prefix("uint")
                    .and_then(|b| b.parse::<u16>().ok())
                    .filter(|b| *b > 0 && *b <= 256 && b % 8 == 0)
                    .ok_or_else(|| format!("unsupported ABI type: {}", other))?;
                Ok(AbiType::Uint(bits))
            }
        }
    }
}

/// A decoded or to-be-encoded ABI value.
///
/// Integers are limited to 128 bits; larger on-chain values fail to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbiValue {
    Uint(u128),
    Address(Address),
    Bool(bool),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    pub fn as_uint(&self) -> Option<u128> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            AbiValue::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// A fully resolved contract method invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract being invoked
    pub contract: Address,

    /// Method name (e.g. `getStakeInfo`)
    pub method: String,

    /// Canonical signature (e.g. `getStakeInfo(address)`)
    pub signature: String,

    /// Encoded-in-order arguments
    pub args: Vec<AbiValue>,

    /// Declared output types, used to decode results
    pub outputs: Vec<AbiType>,
}

/// Options attached to a state-mutating send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOptions {
    /// Native currency attached to the call, in subunits
    pub call_value: u64,

    /// Maximum fee the signer may burn, in subunits
    pub fee_limit: u64,
}

/// Blockchain-specific configuration.
///
/// This is a trait to allow different blockchains to provide their own config types.
pub trait BlockchainConfig: Send + Sync {
    /// Human-readable network name (e.g., "tron-shasta", "tron-mainnet")
    fn network_name(&self) -> &str;

    /// RPC endpoint URL
    fn rpc_url(&self) -> &str;

    /// Validate configuration (e.g., URL format)
    fn validate(&self) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_abi_types() {
        assert_eq!("uint256".parse::<AbiType>().unwrap(), AbiType::Uint(256));
        assert_eq!("uint".parse::<AbiType>().unwrap(), AbiType::Uint(256));
        assert_eq!("uint8".parse::<AbiType>().unwrap(), AbiType::Uint(8));
        assert_eq!("address".parse::<AbiType>().unwrap(), AbiType::Address);
        assert_eq!(
            "uint256[]".parse::<AbiType>().unwrap(),
            AbiType::Array(Box::new(AbiType::Uint(256)))
        );
        assert!("string".parse::<AbiType>().is_err());
        assert!("uint7".parse::<AbiType>().is_err());
    }

    #[test]
    fn canonical_display_round_trips() {
        for raw in ["uint256", "uint64", "bool", "address", "uint256[]"] {
            assert_eq!(raw.parse::<AbiType>().unwrap().to_string(), raw);
        }
    }

    #[test]
    fn uint_width_is_enforced() {
        assert!(AbiType::Uint(8).accepts(&AbiValue::Uint(255)));
        assert!(!AbiType::Uint(8).accepts(&AbiValue::Uint(256)));
        assert!(AbiType::Uint(256).accepts(&AbiValue::Uint(u128::MAX)));
        assert!(!AbiType::Bool.accepts(&AbiValue::Uint(1)));
    }

    #[test]
    fn network_matching_is_case_insensitive() {
        let network = NetworkDescriptor::new("https://api.Shasta.trongrid.io");
        assert!(network.matches("shasta"));
        assert!(!network.matches("nile"));
        assert!(!network.matches(""));
    }
}
