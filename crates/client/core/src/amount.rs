//! Exact TRX amounts.
//!
//! User input is a decimal TRX string; the chain only sees integer sun
//! (1 TRX = 1 000 000 sun). Parsing is done digit by digit so no amount ever
//! passes through floating point.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

pub const SUN_PER_TRX: u64 = 1_000_000;

/// Fractional digits representable in sun.
pub const TRX_DECIMALS: usize = 6;

/// An amount of TRX held as integer sun.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TrxAmount(u64);

impl TrxAmount {
    pub const ZERO: Self = Self(0);

    pub const fn from_sun(sun: u64) -> Self {
        Self(sun)
    }

    /// Convert a sun value read from the chain.
    pub fn try_from_sun(sun: u128) -> Result<Self> {
        u64::try_from(sun)
            .map(Self)
            .map_err(|_| ClientError::InvalidInput(format!("{} sun exceeds the supported range", sun)))
    }

    pub const fn sun(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal TRX string (`"12"`, `"0.5"`, `"3.000001"`).
    ///
    /// Accepts at most six fractional digits. Zero is allowed here; use
    /// [`TrxAmount::parse_positive`] for user-entered amounts.
    pub fn parse_trx(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ClientError::InvalidInput("amount is required".into()));
        }
        if trimmed.starts_with('-') {
            return Err(ClientError::InvalidInput(format!(
                "amount must be positive, got {}",
                trimmed
            )));
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (trimmed, None),
        };

        let malformed = || ClientError::InvalidInput(format!("not a decimal amount: {}", trimmed));

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let fraction = fraction.unwrap_or("");
        if trimmed.contains('.') && fraction.is_empty() {
            return Err(malformed());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if fraction.len() > TRX_DECIMALS {
            return Err(ClientError::InvalidInput(format!(
                "amount has more than {} decimal places: {}",
                TRX_DECIMALS, trimmed
            )));
        }

        let too_large = || ClientError::InvalidInput(format!("amount is too large: {}", trimmed));

        let whole_sun = whole
            .parse::<u64>()
            .map_err(|_| too_large())?
            .checked_mul(SUN_PER_TRX)
            .ok_or_else(too_large)?;

        let fraction_sun = if fraction.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", fraction, width = TRX_DECIMALS);
            padded.parse::<u64>().map_err(|_| malformed())?
        };

        whole_sun
            .checked_add(fraction_sun)
            .map(Self)
            .ok_or_else(too_large)
    }

    /// Parse a user-entered amount, rejecting zero.
    pub fn parse_positive(input: &str) -> Result<Self> {
        let amount = Self::parse_trx(input)?;
        if amount.is_zero() {
            return Err(ClientError::InvalidInput(
                "amount must be greater than zero".into(),
            ));
        }
        Ok(amount)
    }
}

impl FromStr for TrxAmount {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_trx(s)
    }
}

impl fmt::Display for TrxAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SUN_PER_TRX;
        let fraction = self.0 % SUN_PER_TRX;
        if fraction == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:06}", fraction);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}
