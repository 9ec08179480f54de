use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const USD_CURRENCY_CODE: &str = "USD";
pub const USD_CURRENCY_CODE_LOWER: &str = "usd";

//--------------------------------------      MicroUsd       ---------------------------------------------------------
/// A monetary amount in millionths of a dollar. All balance arithmetic in the engine happens on this
/// integer representation; decimal strings only appear at the edges.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct MicroUsd(i64);

const MICRO_SCALE: i64 = 1_000_000;
const MICRO_DECIMALS: u32 = 6;

op!(binary MicroUsd, Add, add);
op!(binary MicroUsd, Sub, sub);
op!(inplace MicroUsd, AddAssign, add_assign);
op!(inplace MicroUsd, SubAssign, sub_assign);
op!(unary MicroUsd, Neg, neg);

impl Mul<i64> for MicroUsd {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for MicroUsd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in micro-dollars: {0}")]
pub struct MicroUsdConversionError(String);

impl From<i64> for MicroUsd {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for MicroUsd {
    type Error = MicroUsdConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MicroUsdConversionError(format!("Value {} is too large to convert to MicroUsd", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl FromStr for MicroUsd {
    type Err = MicroUsdConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MicroUsd::from_decimal_str(s)
    }
}

impl Display for MicroUsd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.as_decimal_string();
        match s.strip_prefix('-') {
            Some(rest) => write!(f, "-${rest}"),
            None => write!(f, "${s}"),
        }
    }
}

impl MicroUsd {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn from_usd(dollars: i64) -> Self {
        Self(dollars * MICRO_SCALE)
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents * MICRO_SCALE / 100)
    }

    /// Renders the amount as a plain decimal string (no currency symbol), e.g. `12.500000`.
    /// This is the representation mirrored into secondary sinks.
    pub fn as_decimal_string(&self) -> String {
        let neg = self.0 < 0;
        let abs = self.0.unsigned_abs();
        let int_part = abs / MICRO_SCALE as u64;
        let frac_part = abs % MICRO_SCALE as u64;
        if neg {
            format!("-{int_part}.{frac_part:06}")
        } else {
            format!("{int_part}.{frac_part:06}")
        }
    }

    /// Parses a decimal string such as `100`, `12.5` or `-0.000001`. At most six fractional digits
    /// are accepted; anything finer has no micro-dollar representation.
    pub fn from_decimal_str(s: &str) -> Result<Self, MicroUsdConversionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MicroUsdConversionError("empty string".to_string()));
        }
        let neg = s.starts_with('-');
        let body = s.strip_prefix('-').unwrap_or(s);
        let mut parts = body.splitn(2, '.');
        let int_part = parts.next().unwrap_or("");
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MicroUsdConversionError(s.to_string()));
        }
        let int_val =
            int_part.parse::<i64>().map_err(|_| MicroUsdConversionError(s.to_string()))?;
        let frac_val = match parts.next() {
            None | Some("") => 0,
            Some(frac) => {
                if frac.len() > MICRO_DECIMALS as usize || !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(MicroUsdConversionError(s.to_string()));
                }
                let padded = frac.parse::<i64>().map_err(|_| MicroUsdConversionError(s.to_string()))?;
                padded * 10_i64.pow(MICRO_DECIMALS - frac.len() as u32)
            },
        };
        let micro = int_val
            .checked_mul(MICRO_SCALE)
            .and_then(|v| v.checked_add(frac_val))
            .ok_or_else(|| MicroUsdConversionError(s.to_string()))?;
        Ok(Self(if neg { -micro } else { micro }))
    }
}
