//! Contract interface parsed from ABI JSON.
use std::collections::HashMap;

use serde::Deserialize;

use client_blockchain_core::{AbiType, AbiValue};

use crate::error::{ClientError, Result};

/// Methods the client cannot work without.
pub const REQUIRED_METHODS: [&str; 10] = [
    "stake",
    "unstake",
    "purchasePack",
    "mintNFT",
    "getStakeInfo",
    "getBandwidthCredits",
    "getUserPacks",
    "getUserNFTs",
    "getPackDetails",
    "getNFTDetails",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    fn parse(raw: Option<&str>, constant: Option<bool>, payable: Option<bool>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("pure") => StateMutability::Pure,
            Some("view") => StateMutability::View,
            Some("payable") => StateMutability::Payable,
            Some(_) => StateMutability::NonPayable,
            // Pre-0.4.16 ABIs only carry the flags
            None if constant == Some(true) => StateMutability::View,
            None if payable == Some(true) => StateMutability::Payable,
            None => StateMutability::NonPayable,
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

/// One callable function of the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: String,
    pub inputs: Vec<AbiType>,
    pub outputs: Vec<AbiType>,
    pub mutability: StateMutability,
}

impl MethodSpec {
    /// Canonical selector text, e.g. `getPackDetails(uint256)`.
    pub fn signature(&self) -> String {
        let inputs: Vec<String> = self.inputs.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    pub fn is_payable(&self) -> bool {
        self.mutability == StateMutability::Payable
    }

    /// Check arguments against the declared inputs.
    pub fn check_args(&self, args: &[AbiValue]) -> Result<()> {
        if args.len() != self.inputs.len() {
            return Err(ClientError::InvalidInput(format!(
                "{} expects {} argument(s), got {}",
                self.signature(),
                self.inputs.len(),
                args.len()
            )));
        }

        for (index, (ty, value)) in self.inputs.iter().zip(args).enumerate() {
            if !ty.accepts(value) {
                return Err(ClientError::InvalidInput(format!(
                    "argument {} of {} must be {}, got {:?}",
                    index,
                    self.name,
                    ty,
                    value
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AbiDocument {
    Entries(Vec<RawEntry>),
    Entrys { entrys: Vec<RawEntry> },
    Nested { abi: Box<AbiDocument> },
}

impl AbiDocument {
    fn into_entries(self) -> Vec<RawEntry> {
        match self {
            AbiDocument::Entries(entries) | AbiDocument::Entrys { entrys: entries } => entries,
            AbiDocument::Nested { abi } => abi.into_entries(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<String>,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    #[serde(rename = "type")]
    ty: String,
}

/// The callable surface of a deployed contract.
#[derive(Debug, Clone, Default)]
pub struct ContractInterface {
    methods: HashMap<String, MethodSpec>,
}

impl ContractInterface {
    /// Parse an ABI document and check that every required method is present.
    ///
    /// Accepts a plain entry array, TronGrid's `{"entrys": [...]}`, or either
    /// of those nested under `"abi"`. Functions using types the client does
    /// not understand are skipped unless they are required.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: AbiDocument = serde_json::from_str(json)
            .map_err(|e| ClientError::Bind(format!("unparseable contract ABI: {}", e)))?;

        let mut methods = HashMap::new();

        for entry in document.into_entries() {
            let is_function = entry
                .kind
                .as_deref()
                .is_none_or(|k| k.eq_ignore_ascii_case("function"));
            let Some(name) = entry.name.filter(|n| !n.is_empty()) else {
                continue;
            };
            if !is_function {
                continue;
            }

            let parsed = parse_types(&entry.inputs).and_then(|inputs| {
                parse_types(&entry.outputs).map(|outputs| (inputs, outputs))
            });

            match parsed {
                Ok((inputs, outputs)) => {
                    let mutability = StateMutability::parse(
                        entry.state_mutability.as_deref(),
                        entry.constant,
                        entry.payable,
                    );
                    methods.insert(
                        name.clone(),
                        MethodSpec {
                            name,
                            inputs,
                            outputs,
                            mutability,
                        },
                    );
                }
                Err(e) if REQUIRED_METHODS.contains(&name.as_str()) => {
                    return Err(ClientError::Bind(format!("{}: {}", name, e)));
                }
                Err(e) => {
                    tracing::debug!("Skipping ABI function {}: {}", name, e);
                }
            }
        }

        let missing: Vec<&str> = REQUIRED_METHODS
            .iter()
            .copied()
            .filter(|m| !methods.contains_key(*m))
            .collect();
        if !missing.is_empty() {
            return Err(ClientError::Bind(format!(
                "contract ABI lacks required method(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self { methods })
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.get(name)
    }

    /// Look up a method, failing with `InvalidInput` when it is unknown.
    pub fn require(&self, name: &str) -> Result<&MethodSpec> {
        self.method(name)
            .ok_or_else(|| ClientError::InvalidInput(format!("contract has no method {}", name)))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

fn parse_types(params: &[RawParam]) -> std::result::Result<Vec<AbiType>, String> {
    params.iter().map(|p| p.ty.parse::<AbiType>()).collect()
}
