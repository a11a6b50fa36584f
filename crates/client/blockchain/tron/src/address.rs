//! TRON address codec.
//!
//! A TRON address is 21 bytes: the `0x41` prefix followed by a 20-byte
//! account hash. The human-readable form is Base58Check (payload plus the
//! first four bytes of a double SHA-256), which always starts with `T`.

use std::fmt;

use sha2::{Digest, Sha256};

/// Version byte prepended to every TRON account hash.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// Errors raised while parsing an address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid Base58 character: {0}")]
    InvalidBase58Char(char),

    #[error("invalid address length: {0} bytes")]
    InvalidLength(usize),

    #[error("invalid address prefix: 0x{0:02x}")]
    InvalidPrefix(u8),

    #[error("invalid checksum")]
    InvalidChecksum,

    #[error("invalid hex address: {0}")]
    InvalidHex(String),
}

/// A validated TRON address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TronAddress([u8; 21]);

impl TronAddress {
    /// The all-zero account (`T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb`).
    pub const ZERO: Self = {
        let mut bytes = [0u8; 21];
        bytes[0] = ADDRESS_PREFIX;
        Self(bytes)
    };

    /// Parse a Base58Check address (`T...`).
    pub fn from_base58(input: &str) -> Result<Self, AddressError> {
        let decoded = base58_decode(input.trim())?;

        if decoded.len() != 25 {
            return Err(AddressError::InvalidLength(decoded.len()));
        }

        let (payload, checksum) = decoded.split_at(21);
        if checksum != &double_sha256(payload)[..4] {
            return Err(AddressError::InvalidChecksum);
        }

        Self::from_payload(payload)
    }

    /// Parse the hex form (`41` + 40 hex chars, optional `0x`).
    pub fn from_hex(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed).map_err(|e| AddressError::InvalidHex(e.to_string()))?;

        if bytes.len() != 21 {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        Self::from_payload(&bytes)
    }

    /// Build from the 20-byte account hash found in ABI words.
    pub fn from_account_hash(hash: &[u8; 20]) -> Self {
        let mut bytes = [0u8; 21];
        bytes[0] = ADDRESS_PREFIX;
        bytes[1..].copy_from_slice(hash);
        Self(bytes)
    }

    fn from_payload(payload: &[u8]) -> Result<Self, AddressError> {
        if payload[0] != ADDRESS_PREFIX {
            return Err(AddressError::InvalidPrefix(payload[0]));
        }
        let mut bytes = [0u8; 21];
        bytes.copy_from_slice(payload);
        Ok(Self(bytes))
    }

    /// 20-byte account hash (the part that goes into ABI words).
    pub fn account_hash(&self) -> &[u8] {
        &self.0[1..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_base58(&self) -> String {
        let mut data = self.0.to_vec();
        data.extend_from_slice(&double_sha256(&self.0)[..4]);
        base58_encode(&data)
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

// ============================================================================
// Base58 Implementation
// ============================================================================

const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn base58_decode(input: &str) -> Result<Vec<u8>, AddressError> {
    let mut result: Vec<u8> = Vec::new();

    // Leading '1's become leading zero bytes
    let leading_zeros = input.chars().take_while(|&c| c == '1').count();

    for c in input.chars() {
        let value = BASE58_ALPHABET
            .iter()
            .position(|&x| c.is_ascii() && x == c as u8)
            .ok_or(AddressError::InvalidBase58Char(c))? as u32;

        let mut carry = value;
        for byte in result.iter_mut().rev() {
            let temp = (*byte as u32) * 58 + carry;
            *byte = (temp & 0xFF) as u8;
            carry = temp >> 8;
        }

        while carry > 0 {
            result.insert(0, (carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut decoded = vec![0u8; leading_zeros];
    decoded.extend(result);
    Ok(decoded)
}

fn base58_encode(input: &[u8]) -> String {
    // Base58 digits, least significant first
    let mut digits: Vec<u8> = Vec::new();

    for &byte in input {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            let temp = (*digit as u32) * 256 + carry;
            *digit = (temp % 58) as u8;
            carry = temp / 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let leading_zeros = input.iter().take_while(|&&b| b == 0).count();

    std::iter::repeat_n('1', leading_zeros)
        .chain(digits.iter().rev().map(|&d| BASE58_ALPHABET[d as usize] as char))
        .collect()
}
