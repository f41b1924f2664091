//! Core business logic - framework-agnostic ledger operations.
//!
//! Pure computations (invoice cycles, installments, recurrence, invoice
//! aggregation, reports) take slices of models and never touch the database.
//! The async modules persist through `SeaORM` and return [`crate::errors::Result`].

/// Monthly budgets per category
pub mod budget;
/// Month arithmetic and `YYYY-MM` keys
pub mod calendar;
/// Credit cards
pub mod card;
/// User-managed categories
pub mod category;
/// Validated transactions waiting to be stored
pub mod draft;
/// Savings goals and contributions
pub mod goal;
/// Spreadsheet row import
pub mod import;
/// Installment splitting
pub mod installment;
/// Invoice aggregation and settlement
pub mod invoice;
/// Invoice period of a credit charge
pub mod invoice_cycle;
/// Decimal amounts and stored cents
pub mod money;
/// User-managed payment methods
pub mod payment_method;
/// Recurring transactions and subscriptions
pub mod recurrence;
/// Dashboard and reporting
pub mod report;
/// Transaction persistence
pub mod transaction;
