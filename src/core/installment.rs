//! Installment splitting for credit card purchases.
//!
//! A purchase of `total` in `count` installments becomes `count` records due one
//! calendar month apart. Every part is a whole number of cents; the per-part
//! value is truncated and whatever is left over lands on the first installment,
//! so the parts always add back up to the exact total.

use crate::{
    core::{calendar::add_months, invoice_cycle::calculate_invoice_month, money},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One installment of a split purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallmentRecord {
    /// 1-based position in the series
    pub index: u32,
    /// Total number of installments
    pub count: u32,
    /// Amount of this installment
    pub amount: Decimal,
    /// Due date, `index - 1` months after the first
    pub due_date: NaiveDate,
    /// Description annotated with `(index/count)`
    pub description: String,
    /// Invoice period derived from this installment's own due date
    pub invoice_month: String,
}

/// Splits `total` into `count` monthly installments.
///
/// The first installment is due on `first_due_date` and each later one a calendar
/// month further, clamped to the end of short months. A single installment keeps
/// the description unchanged.
///
/// # Errors
/// - [`Error::InvalidInstallmentCount`] when `count` is zero or the total has fewer
///   cents than there are installments
/// - [`Error::InvalidAmount`] when `total` is not positive or finer than a cent
pub fn split_into_installments(
    total: Decimal,
    count: u32,
    first_due_date: NaiveDate,
    description: &str,
    closing_day: u32,
) -> Result<Vec<InstallmentRecord>> {
    if count == 0 {
        return Err(Error::InvalidInstallmentCount {
            count,
            amount: total,
        });
    }
    let total_cents = money::positive_cents(total)?;
    let parts = i64::from(count);
    if total_cents < parts {
        return Err(Error::InvalidInstallmentCount {
            count,
            amount: total,
        });
    }

    // Integer division truncates, the remainder goes to the first part.
    let base_cents = total_cents / parts;
    let residual_cents = total_cents - base_cents * parts;

    let records = (0..count)
        .map(|offset| {
            let index = offset + 1;
            let cents = if offset == 0 {
                base_cents + residual_cents
            } else {
                base_cents
            };
            let due_date = add_months(first_due_date, offset);
            let description = if count == 1 {
                description.to_string()
            } else {
                format!("{description} ({index}/{count})")
            };
            InstallmentRecord {
                index,
                count,
                amount: money::from_cents(cents),
                due_date,
                description,
                invoice_month: calculate_invoice_month(due_date, closing_day),
            }
        })
        .collect();

    Ok(records)
}
