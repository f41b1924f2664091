//! Shared test utilities for the household ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating drafts, stored records and cards with sensible defaults.
#![allow(clippy::unwrap_used)]

use crate::{
    config::settings::AppConfig,
    core::{card, draft::NewTransaction, money, payment_method, transaction},
    entities::{
        self, ExpenseType, TransactionKind, TransactionStatus, transaction::CREDIT_PAYMENT_METHOD,
    },
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::str::FromStr;

fn dec(amount: &str) -> Decimal {
    Decimal::from_str(amount).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Creates an in-memory `SQLite` database with all tables initialized and the
/// default payment methods in place.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    payment_method::seed_payment_methods(&db).await?;
    Ok(db)
}

/// Configuration with partners "Ana" and "Bruno" and the default horizon.
pub fn test_config() -> AppConfig {
    AppConfig {
        partners: vec!["Ana".to_string(), "Bruno".to_string()],
        ..AppConfig::default()
    }
}

/// Sets up a test database with one card.
///
/// # Defaults
/// * `name`: "Visa"
/// * `holder`: "Ana"
/// * `closing_day`: 10
/// * `due_day`: 20
pub async fn setup_with_card() -> Result<(DatabaseConnection, entities::card::Model)> {
    let db = setup_test_db().await?;
    let card = card::create_card(&db, "Visa".to_string(), "Ana".to_string(), 10, 20).await?;
    Ok((db, card))
}

/// A pending, variable "Food" expense due 2024-03-20.
pub fn expense_draft(description: &str, amount: &str) -> NewTransaction {
    NewTransaction::new(
        description,
        dec(amount),
        TransactionKind::Expense,
        "Food",
        date(2024, 3, 20),
    )
}

/// A credit charge on `card_id` made on 2024-03-05, invoice period left to the card.
pub fn credit_draft(card_id: i64, description: &str, amount: &str) -> NewTransaction {
    NewTransaction {
        payment_method: CREDIT_PAYMENT_METHOD.to_string(),
        card_id: Some(card_id),
        due_date: date(2024, 3, 5),
        ..expense_draft(description, amount)
    }
}

/// Stores a single non-recurring expense built by [`expense_draft`].
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    description: &str,
    amount: &str,
) -> Result<entities::transaction::Model> {
    let draft = expense_draft(description, amount);
    let mut created = transaction::create_transaction(db, draft, &test_config()).await?;
    Ok(created.remove(0))
}

/// Stores a credit charge built by [`credit_draft`].
pub async fn create_test_credit_purchase(
    db: &DatabaseConnection,
    card_id: i64,
    description: &str,
    amount: &str,
) -> Result<entities::transaction::Model> {
    let draft = credit_draft(card_id, description, amount);
    let mut created = transaction::create_transaction(db, draft, &test_config()).await?;
    Ok(created.remove(0))
}

/// An already stored pending "Food" expense, for the pure functions.
pub fn stored_transaction(
    id: i64,
    description: &str,
    amount: &str,
    due_date: NaiveDate,
) -> entities::transaction::Model {
    entities::transaction::Model {
        id,
        description: description.to_string(),
        amount_cents: money::to_cents(dec(amount)).unwrap(),
        kind: TransactionKind::Expense,
        category: "Food".to_string(),
        status: TransactionStatus::Pending,
        due_date,
        payment_date: None,
        paid_by: "Joint".to_string(),
        payment_method: "pix".to_string(),
        expense_type: Some(ExpenseType::Variable),
        is_recurring: false,
        series_id: None,
        card_id: None,
        invoice_month: None,
        is_invoice_payment: false,
        created_at: Utc::now(),
    }
}

/// An already stored credit charge due on the first day of `invoice_month`.
pub fn stored_credit_charge(
    id: i64,
    card_id: i64,
    invoice_month: &str,
    amount: &str,
) -> entities::transaction::Model {
    let due_date = crate::core::calendar::parse_month_key(invoice_month).unwrap();
    entities::transaction::Model {
        payment_method: CREDIT_PAYMENT_METHOD.to_string(),
        card_id: Some(card_id),
        invoice_month: Some(invoice_month.to_string()),
        ..stored_transaction(id, "Card purchase", amount, due_date)
    }
}

/// A card model that is not stored anywhere.
pub fn stored_card(id: i64, name: &str, closing_day: u32) -> entities::card::Model {
    entities::card::Model {
        id,
        name: name.to_string(),
        holder: "Ana".to_string(),
        closing_day,
        due_day: 20,
    }
}
