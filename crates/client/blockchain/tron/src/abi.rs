//! ABI word codec for TVM contract calls.
//!
//! TRON contracts use the Solidity ABI. Only the types the client needs are
//! supported: static `uintN`, `bool`, `address`, and dynamic arrays of static
//! types in outputs.

use client_blockchain_core::{AbiType, AbiValue, Address, TransportError};

use crate::address::TronAddress;

const WORD: usize = 32;

/// Encode call arguments as the hex `parameter` string expected by the node.
pub fn encode_params(args: &[AbiValue]) -> Result<String, TransportError> {
    let mut out = Vec::with_capacity(args.len() * WORD);

    for arg in args {
        out.extend_from_slice(&encode_static(arg)?);
    }

    Ok(hex::encode(out))
}

fn encode_static(value: &AbiValue) -> Result<[u8; WORD], TransportError> {
    let mut word = [0u8; WORD];

    match value {
        AbiValue::Uint(v) => word[16..].copy_from_slice(&v.to_be_bytes()),
        AbiValue::Bool(b) => word[31] = u8::from(*b),
        AbiValue::Address(address) => {
            let parsed = parse_address(address)?;
            word[12..].copy_from_slice(parsed.account_hash());
        }
        AbiValue::Array(_) => {
            return Err(TransportError::Unsupported(
                "dynamic array arguments are not supported".into(),
            ));
        }
    }

    Ok(word)
}

/// Decode a constant call result against the declared output types.
pub fn decode_outputs(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, TransportError> {
    types
        .iter()
        .enumerate()
        .map(|(index, ty)| {
            let head = word_at(data, index * WORD)?;
            match ty {
                AbiType::Array(inner) => {
                    let offset = word_to_usize(head)?;
                    let len = word_to_usize(word_at(data, offset)?)?;
                    let items = (0..len)
                        .map(|i| decode_static(inner, word_at(data, offset + WORD + i * WORD)?))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(AbiValue::Array(items))
                }
                _ => decode_static(ty, head),
            }
        })
        .collect()
}

fn decode_static(ty: &AbiType, word: &[u8]) -> Result<AbiValue, TransportError> {
    match ty {
        AbiType::Uint(_) => Ok(AbiValue::Uint(word_to_u128(word)?)),
        AbiType::Bool => match word_to_u128(word)? {
            0 => Ok(AbiValue::Bool(false)),
            1 => Ok(AbiValue::Bool(true)),
            other => Err(TransportError::Decode(format!("invalid bool word: {}", other))),
        },
        AbiType::Address => {
            if word[..12].iter().any(|&b| b != 0) {
                return Err(TransportError::Decode("address word has dirty high bytes".into()));
            }
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&word[12..]);
            let address = TronAddress::from_account_hash(&hash);
            Ok(AbiValue::Address(Address::new_unchecked(address.to_base58())))
        }
        AbiType::Array(_) => Err(TransportError::Unsupported(
            "nested dynamic arrays are not supported".into(),
        )),
    }
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], TransportError> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            TransportError::Decode(format!(
                "result truncated: need word at offset {}, have {} bytes",
                offset,
                data.len()
            ))
        })
}

fn word_to_u128(word: &[u8]) -> Result<u128, TransportError> {
    if word[..16].iter().any(|&b| b != 0) {
        return Err(TransportError::Decode("integer exceeds 128 bits".into()));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

fn word_to_usize(word: &[u8]) -> Result<usize, TransportError> {
    usize::try_from(word_to_u128(word)?)
        .map_err(|_| TransportError::Decode("offset does not fit in usize".into()))
}

pub(crate) fn parse_address(address: &Address) -> Result<TronAddress, TransportError> {
    TronAddress::from_base58(address.as_str())
        .map_err(|e| TransportError::Config(format!("invalid TRON address {}: {}", address, e)))
}
