//! Spreadsheet import - turns raw rows into transactions.
//!
//! Parsing the file itself happens elsewhere; this module receives one
//! [`ImportRow`] of raw strings per line. Rows that cannot be understood are
//! skipped one by one with a warning, the rest are stored in a single batch.

use crate::{
    config::settings::AppConfig,
    core::{
        calendar, category::FALLBACK_CATEGORY, draft::NewTransaction,
        transaction::create_transactions,
    },
    entities::{ExpenseType, TransactionKind, TransactionStatus},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{info, warn};

/// One row of an imported sheet. Column headers may be in English or Portuguese.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImportRow {
    /// Description
    #[serde(alias = "Descrição")]
    pub description: String,
    /// Amount, `1234.56`, `1.234,56` or `R$ 1.234,56`
    #[serde(alias = "Valor")]
    pub amount: String,
    /// `Income`/`Expense` or `Receita`/`Despesa`
    #[serde(alias = "Tipo")]
    pub kind: String,
    /// `YYYY-MM-DD` or `DD/MM/YYYY`
    #[serde(alias = "Vencimento")]
    pub due_date: String,
    /// Optional payment date, same formats as the due date
    #[serde(default, alias = "Data Pagamento")]
    pub payment_date: Option<String>,
    /// Category name, empty or `N/A` for none
    #[serde(default, alias = "Categoria")]
    pub category: Option<String>,
    /// `Paid`/`Pending` or `Pago`/`A Pagar`
    #[serde(default, alias = "Status")]
    pub status: Option<String>,
    /// `Fixed`/`Fixa` or anything else for variable
    #[serde(default, alias = "Tipo de Despesa")]
    pub expense_type: Option<String>,
    /// `Yes`/`Sim`/`true` marks a recurring bill
    #[serde(default, alias = "Recorrente")]
    pub recurring: Option<String>,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows stored
    pub imported: usize,
    /// Rows skipped as unreadable
    pub skipped: usize,
}

/// Parses an amount in plain or Brazilian notation.
///
/// `R$` and spaces are ignored. When both separators appear the dots are
/// thousands separators; a lone comma is the decimal separator.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut cleaned: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.contains(',') && cleaned.contains('.') {
        cleaned = cleaned.replace('.', "");
    }
    Decimal::from_str(&cleaned.replace(',', ".")).ok()
}

/// Parses `DD/MM/YYYY` or ISO dates.
#[must_use]
pub fn parse_import_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.contains('/') {
        NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
    } else {
        calendar::parse_date(raw).ok()
    }
}

fn parse_kind(raw: &str) -> Option<TransactionKind> {
    match raw.trim().to_lowercase().as_str() {
        "income" | "receita" => Some(TransactionKind::Income),
        "expense" | "despesa" => Some(TransactionKind::Expense),
        _ => None,
    }
}

fn parse_status(raw: &str) -> Option<TransactionStatus> {
    match raw.trim().to_lowercase().as_str() {
        "paid" | "pago" => Some(TransactionStatus::Paid),
        "pending" | "a pagar" => Some(TransactionStatus::Pending),
        _ => None,
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Turns a row into a draft, or `None` when the row has to be skipped.
#[must_use]
pub fn draft_from_row(row: &ImportRow, paid_by: &str) -> Option<NewTransaction> {
    let Some(due_date) = parse_import_date(&row.due_date) else {
        warn!(
            "Skipping import row '{}': invalid due date '{}'",
            row.description, row.due_date
        );
        return None;
    };
    let Some(amount) = parse_amount(&row.amount).filter(|a| *a > Decimal::ZERO) else {
        warn!(
            "Skipping import row '{}': invalid amount '{}'",
            row.description, row.amount
        );
        return None;
    };
    let Some(kind) = parse_kind(&row.kind) else {
        warn!(
            "Skipping import row '{}': unknown type '{}'",
            row.description, row.kind
        );
        return None;
    };

    // An unreadable payment date is dropped, not fatal.
    let payment_date = non_blank(row.payment_date.as_ref()).and_then(parse_import_date);
    let status = non_blank(row.status.as_ref())
        .and_then(parse_status)
        .unwrap_or(if payment_date.is_some() {
            TransactionStatus::Paid
        } else {
            TransactionStatus::Pending
        });
    let category = match non_blank(row.category.as_ref()) {
        None | Some("N/A") => FALLBACK_CATEGORY.to_string(),
        Some(name) => name.to_string(),
    };
    let expense_type = match non_blank(row.expense_type.as_ref()).map(str::to_lowercase) {
        Some(value) if value == "fixed" || value == "fixa" => ExpenseType::Fixed,
        _ => ExpenseType::Variable,
    };
    let is_recurring = non_blank(row.recurring.as_ref())
        .is_some_and(|v| matches!(v.to_lowercase().as_str(), "yes" | "sim" | "true"));

    Some(NewTransaction {
        status,
        payment_date,
        paid_by: paid_by.to_string(),
        expense_type: Some(expense_type),
        is_recurring,
        ..NewTransaction::new(row.description.clone(), amount, kind, category, due_date)
    })
}

/// Converts and normalizes rows, counting the ones that had to be skipped.
#[must_use]
pub fn prepare_import(
    rows: &[ImportRow],
    paid_by: &str,
    today: NaiveDate,
) -> (Vec<NewTransaction>, usize) {
    let mut drafts = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for row in rows {
        match draft_from_row(row, paid_by).map(|draft| draft.normalize(today)) {
            Some(Ok(draft)) => drafts.push(draft),
            Some(Err(e)) => {
                warn!("Skipping import row '{}': {}", row.description, e);
                skipped += 1;
            }
            None => skipped += 1,
        }
    }
    (drafts, skipped)
}

/// Imports rows, attributing them to `paid_by`.
///
/// `paid_by` must be a configured partner or the joint account. Bad rows are
/// skipped individually; the valid ones are stored together, so a database
/// failure stores none of them and is returned.
pub async fn import_rows(
    db: &DatabaseConnection,
    rows: &[ImportRow],
    paid_by: &str,
    config: &AppConfig,
) -> crate::errors::Result<ImportSummary> {
    config.check_payer(paid_by)?;
    let (drafts, skipped) = prepare_import(rows, paid_by, Utc::now().date_naive());
    let imported = if drafts.is_empty() {
        0
    } else {
        create_transactions(db, drafts, config).await?.len()
    };
    info!("Import finished: {} imported, {} skipped", imported, skipped);
    Ok(ImportSummary { imported, skipped })
}
