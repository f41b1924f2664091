//! Billing-cycle math: which monthly invoice a credit card charge is billed under.

use crate::core::calendar::{add_months, first_of_month, month_key};
use chrono::{Datelike, NaiveDate};

/// Returns the `YYYY-MM` invoice period of a charge made on `purchase_date`.
///
/// Charges on or after the card's closing day roll into the next month's
/// invoice; earlier charges stay on the current month's invoice. A closing day
/// of 31 in a 30-day month therefore keeps every charge of that month on its own
/// invoice, since no purchase day can reach it.
#[must_use]
pub fn calculate_invoice_month(purchase_date: NaiveDate, closing_day: u32) -> String {
    let month_start = first_of_month(purchase_date);
    if purchase_date.day() >= closing_day {
        month_key(add_months(month_start, 1))
    } else {
        month_key(month_start)
    }
}
