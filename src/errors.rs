//! Unified error type for the ledger.
//!
//! Every fallible operation in the crate returns [`Result`], so callers only ever
//! have to match on a single enum regardless of whether a failure came from input
//! validation, a missing record, or the database itself.

use rust_decimal::Decimal;
use thiserror::Error;

/// All errors produced by the ledger core and its persistence layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Amount is not positive or is finer than one cent
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Installment count is zero, or too large for the amount to give every part at least one cent
    #[error("Invalid installment count {count} for amount {amount}")]
    InvalidInstallmentCount {
        /// The rejected count
        count: u32,
        /// The amount being split
        amount: Decimal,
    },

    /// A closing or due day outside 1..=31
    #[error("Invalid day of month: {day} (expected 1-31)")]
    InvalidDay {
        /// The rejected day
        day: u32,
    },

    /// A date string that could not be parsed
    #[error("Invalid date '{value}'")]
    InvalidDate {
        /// The raw input
        value: String,
    },

    /// An invoice period key that is not `YYYY-MM`
    #[error("Invalid month '{value}', expected YYYY-MM")]
    InvalidMonth {
        /// The raw input
        value: String,
    },

    /// A record violates one of the transaction invariants
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong
        message: String,
    },

    /// No transaction with the given id
    #[error("Transaction {id} not found")]
    TransactionNotFound {
        /// The missing id
        id: i64,
    },

    /// No card with the given id
    #[error("Card {id} not found")]
    CardNotFound {
        /// The missing id
        id: i64,
    },

    /// No category with the given name
    #[error("Category '{name}' not found")]
    CategoryNotFound {
        /// The missing name
        name: String,
    },

    /// A card or category cannot be deleted while transactions reference it
    #[error("{entity} '{name}' is referenced by {count} transaction(s)")]
    InUse {
        /// Kind of record ("card" or "category")
        entity: &'static str,
        /// Display name of the record
        name: String,
        /// Number of referencing transactions
        count: u64,
    },

    /// A settling transaction already exists for this invoice
    #[error("Invoice {invoice_month} of card {card_id} is already paid")]
    InvoiceAlreadyPaid {
        /// Card of the invoice
        card_id: i64,
        /// Invoice period
        invoice_month: String,
    },

    /// The invoice period has no charges to pay
    #[error("Invoice {invoice_month} of card {card_id} has no charges")]
    EmptyInvoice {
        /// Card of the invoice
        card_id: i64,
        /// Invoice period
        invoice_month: String,
    },

    /// `paid_by` names neither a configured partner nor the joint account
    #[error("Unknown payer '{name}'")]
    UnknownPayer {
        /// The rejected name
        name: String,
    },

    /// No savings goal with the given id
    #[error("Goal {id} not found")]
    GoalNotFound {
        /// The missing id
        id: i64,
    },

    /// A payment method with the same identifier already exists
    #[error("Payment method '{id}' already exists")]
    DuplicatePaymentMethod {
        /// Identifier derived from the name
        id: String,
    },

    /// Credit purchases are never paid one by one
    #[error("Transaction {id} is a credit card charge and is settled through its invoice")]
    CreditSettledByInvoice {
        /// The credit transaction
        id: i64,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
