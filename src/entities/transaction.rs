//! Transaction entity - Represents every financial record of the household.
//!
//! Amounts are stored as positive integer cents in `amount_cents`; use
//! [`Model::amount`] to read them as a `Decimal`. Credit card purchases carry a
//! `card_id` and the `invoice_month` (`YYYY-MM`) they are billed under, and are
//! settled by a separate record with `is_invoice_payment` set.
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment method identifier for credit card charges.
pub const CREDIT_PAYMENT_METHOD: &str = "credit";

/// Direction of the money flow
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionKind {
    /// Money coming into the household
    #[sea_orm(string_value = "income")]
    Income,
    /// Money leaving the household
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Settlement status
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionStatus {
    /// Settled, `payment_date` is set
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Still to be paid
    #[sea_orm(string_value = "pending")]
    Pending,
}

/// Expense classification, only meaningful for expenses
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ExpenseType {
    /// Recurs with the same value (rent, internet)
    #[sea_orm(string_value = "fixed")]
    Fixed,
    /// Changes month to month
    #[sea_orm(string_value = "variable")]
    Variable,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable description, also the legacy subscription grouping key
    pub description: String,
    /// Amount in cents, always positive
    pub amount_cents: i64,
    /// Income or expense
    pub kind: TransactionKind,
    /// Name of the category this transaction is filed under
    pub category: String,
    /// Paid or pending
    pub status: TransactionStatus,
    /// When the transaction is due
    pub due_date: Date,
    /// When it was paid, `None` while pending
    pub payment_date: Option<Date>,
    /// Partner name, or `"Joint"`
    pub paid_by: String,
    /// Payment method identifier (`pix`, `cash`, `debit`, `credit`, `transfer`, ...)
    pub payment_method: String,
    /// Fixed or variable, `None` for income
    pub expense_type: Option<ExpenseType>,
    /// Whether this transaction belongs to a recurring subscription
    pub is_recurring: bool,
    /// Id of the recurring base shared by all its occurrences
    pub series_id: Option<i64>,
    /// Card the charge was made on, credit only
    pub card_id: Option<i64>,
    /// Invoice period `YYYY-MM`, set together with `card_id`
    pub invoice_month: Option<String>,
    /// Marks a record that pays a whole invoice
    pub is_invoice_payment: bool,
    /// When the record was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Amount as a two-decimal `Decimal`
    #[must_use]
    pub fn amount(&self) -> Decimal {
        crate::core::money::from_cents(self.amount_cents)
    }

    /// Whether this is a credit card charge that belongs to an invoice
    #[must_use]
    pub fn is_credit_charge(&self) -> bool {
        self.payment_method == CREDIT_PAYMENT_METHOD
            && self.card_id.is_some()
            && self.invoice_month.is_some()
    }

    /// Whether this record is still pending
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

/// Transactions reference cards and categories loosely; deletion guards live in `core`
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
