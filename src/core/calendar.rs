//! Calendar helpers shared by the invoice, installment and recurrence logic.
//!
//! Month keys are fixed-width `YYYY-MM` strings, so sorting them as strings is
//! the same as sorting them chronologically.

use crate::errors::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};

/// Advances `date` by `months` calendar months.
///
/// The day of month is preserved where it exists and clamped to the last day of
/// the target month otherwise (Jan 31 + 1 month is Feb 28, or Feb 29 in a leap year).
#[must_use]
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    // Only fails past year 262143.
    date.checked_add_months(Months::new(months)).unwrap_or(NaiveDate::MAX)
}

/// Formats the `YYYY-MM` key of the month containing `date`.
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// First day of the month containing `date`.
#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
#[must_use]
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    add_months(first_of_month(date), 1)
        .pred_opt()
        .unwrap_or(date)
}

/// Parses a `YYYY-MM` key into the first day of that month.
pub fn parse_month_key(key: &str) -> Result<NaiveDate> {
    let trimmed = key.trim();
    if trimmed.len() != 7 {
        return Err(Error::InvalidMonth {
            value: key.to_string(),
        });
    }
    NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").map_err(|_| {
        Error::InvalidMonth {
            value: key.to_string(),
        }
    })
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        value: value.to_string(),
    })
}
