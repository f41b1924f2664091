//! Conversions between `Decimal` amounts and the integer cents stored in the database.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Number of decimal places of the household currency.
pub const MINOR_UNITS: u32 = 2;

/// Converts a stored cent value back into a two-decimal amount.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MINOR_UNITS)
}

/// Converts an amount into whole cents.
///
/// Amounts finer than one cent are rejected rather than silently rounded, so that
/// what gets stored is exactly what the caller asked for.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    if amount.round_dp(MINOR_UNITS) != amount {
        return Err(Error::InvalidAmount { amount });
    }
    (amount * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or(Error::InvalidAmount { amount })
}

/// Like [`to_cents`], but also requires the amount to be strictly positive.
pub fn positive_cents(amount: Decimal) -> Result<i64> {
    let cents = to_cents(amount)?;
    if cents <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(cents)
}

/// Sums the amounts of a set of cent values as a `Decimal`.
pub fn sum_cents<I: IntoIterator<Item = i64>>(cents: I) -> Decimal {
    from_cents(cents.into_iter().sum())
}
