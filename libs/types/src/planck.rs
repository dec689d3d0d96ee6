//! Planck amounts and the bigint persistence convention
//!
//! A planck is the smallest indivisible unit of a token. Amounts are `u128`
//! on chain, which JSON numbers cannot carry losslessly past 2^53 - 1. Values
//! in the safe range serialize as plain numbers; anything larger becomes the
//! string `"bigint:<decimal digits>"`. Decoding accepts both forms (and bare
//! digit strings), so the convention applies wherever a `Planck` appears in a
//! nested value.

use crate::TypeError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Prefix marking an integer that was too wide for a JSON number
pub const BIGINT_TAG: &str = "bigint:";

/// Largest integer a JSON number (IEEE-754 double) represents exactly
pub const MAX_SAFE_INTEGER: u128 = (1 << 53) - 1;

/// Highest scale `rust_decimal` supports
const MAX_DECIMALS: u8 = 28;

/// Token amount in plancks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Planck(pub u128);

impl Planck {
    pub const ZERO: Planck = Planck(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert to a human-readable amount with `decimals` fractional digits
    pub fn to_decimal(self, decimals: u8) -> Result<Decimal, TypeError> {
        if decimals > MAX_DECIMALS {
            return Err(TypeError::UnsupportedDecimals(decimals));
        }
        let mantissa = i128::try_from(self.0)
            .map_err(|_| TypeError::AmountOutOfRange(self.0.to_string()))?;
        Decimal::try_from_i128_with_scale(mantissa, u32::from(decimals))
            .map_err(|_| TypeError::AmountOutOfRange(self.0.to_string()))
    }

    /// Convert a human-readable amount to plancks, truncating sub-planck digits
    pub fn from_decimal(amount: Decimal, decimals: u8) -> Result<Self, TypeError> {
        if decimals > MAX_DECIMALS {
            return Err(TypeError::UnsupportedDecimals(decimals));
        }
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(TypeError::AmountOutOfRange(amount.to_string()));
        }

        let mut scaled = amount;
        for _ in 0..decimals {
            scaled = scaled
                .checked_mul(Decimal::TEN)
                .ok_or_else(|| TypeError::AmountOutOfRange(amount.to_string()))?;
        }

        scaled
            .trunc()
            .to_u128()
            .map(Planck)
            .ok_or_else(|| TypeError::AmountOutOfRange(amount.to_string()))
    }
}

impl From<u128> for Planck {
    fn from(value: u128) -> Self {
        Planck(value)
    }
}

impl From<Planck> for u128 {
    fn from(value: Planck) -> Self {
        value.0
    }
}

impl fmt::Display for Planck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Planck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 <= MAX_SAFE_INTEGER {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.collect_str(&format_args!("{BIGINT_TAG}{}", self.0))
        }
    }
}

struct PlanckVisitor;

impl<'de> Visitor<'de> for PlanckVisitor {
    type Value = Planck;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or a \"bigint:<digits>\" string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Planck, E> {
        Ok(Planck(u128::from(v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Planck, E> {
        Ok(Planck(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Planck, E> {
        u128::try_from(v)
            .map(Planck)
            .map_err(|_| E::custom(format!("negative amount {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Planck, E> {
        let digits = v.strip_prefix(BIGINT_TAG).unwrap_or(v);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(E::custom(format!("malformed bigint string '{v}'")));
        }
        digits
            .parse::<u128>()
            .map(Planck)
            .map_err(|_| E::custom(format!("bigint out of range '{v}'")))
    }
}

impl<'de> Deserialize<'de> for Planck {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PlanckVisitor)
    }
}
