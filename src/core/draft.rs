//! Transactions that have not been persisted yet.
//!
//! A [`NewTransaction`] is what the entry form, an import row, the installment
//! splitter, the recurrence projector and the invoice payment all produce. It has
//! no identity; the database assigns one on insert. [`NewTransaction::normalize`]
//! applies the form rules and checks the transaction invariants before anything
//! is written.

use crate::{
    core::money,
    entities::{
        ExpenseType, TransactionKind, TransactionStatus,
        transaction::{self, CREDIT_PAYMENT_METHOD},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::Set;

/// `paid_by` value for expenses shared by the couple.
pub const JOINT: &str = "Joint";

/// Payment method assumed when none is given.
pub const DEFAULT_PAYMENT_METHOD: &str = "pix";

/// A transaction waiting to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Human-readable description
    pub description: String,
    /// Positive amount with at most two decimal places
    pub amount: Decimal,
    /// Income or expense
    pub kind: TransactionKind,
    /// Category name
    pub category: String,
    /// Paid or pending
    pub status: TransactionStatus,
    /// Due date
    pub due_date: NaiveDate,
    /// Payment date, only for paid transactions
    pub payment_date: Option<NaiveDate>,
    /// Partner name or [`JOINT`]
    pub paid_by: String,
    /// Payment method identifier
    pub payment_method: String,
    /// Fixed or variable, expenses only
    pub expense_type: Option<ExpenseType>,
    /// Recurring subscription flag
    pub is_recurring: bool,
    /// Recurring series this belongs to
    pub series_id: Option<i64>,
    /// Card of a credit charge
    pub card_id: Option<i64>,
    /// Invoice period of a credit charge
    pub invoice_month: Option<String>,
    /// Settles a whole invoice
    pub is_invoice_payment: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    /// Creates a pending, joint, non-recurring transaction paid by pix.
    ///
    /// Use struct update syntax to change anything else:
    /// `NewTransaction { status: TransactionStatus::Paid, ..NewTransaction::new(...) }`.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        kind: TransactionKind,
        category: impl Into<String>,
        due_date: NaiveDate,
    ) -> Self {
        let expense_type = match kind {
            TransactionKind::Expense => Some(ExpenseType::Variable),
            TransactionKind::Income => None,
        };
        Self {
            description: description.into(),
            amount,
            kind,
            category: category.into(),
            status: TransactionStatus::Pending,
            due_date,
            payment_date: None,
            paid_by: JOINT.to_string(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            expense_type,
            is_recurring: false,
            series_id: None,
            card_id: None,
            invoice_month: None,
            is_invoice_payment: false,
            created_at: Utc::now(),
        }
    }

    /// Whether this is paid with a credit card.
    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.payment_method == CREDIT_PAYMENT_METHOD
    }

    /// Applies the entry-form rules and validates the invariants.
    ///
    /// - the description and category are trimmed and must not be empty
    /// - the amount must be positive with at most two decimal places
    /// - a paid transaction without payment date is paid on `today`
    /// - a pending transaction never keeps a payment date
    /// - income never carries an expense type
    /// - credit charges are always pending and need both card and invoice period
    /// - card and invoice period are set together or not at all, and only on
    ///   credit charges and invoice payments
    /// - invoice payments cannot themselves be paid by credit
    pub fn normalize(mut self, today: NaiveDate) -> Result<Self> {
        self.description = self.description.trim().to_string();
        if self.description.is_empty() {
            return Err(Error::Validation {
                message: "Description cannot be empty".to_string(),
            });
        }
        self.category = self.category.trim().to_string();
        if self.category.is_empty() {
            return Err(Error::Validation {
                message: "Category cannot be empty".to_string(),
            });
        }
        money::positive_cents(self.amount)?;

        if self.kind == TransactionKind::Income {
            self.expense_type = None;
        }

        if self.is_credit() && !self.is_invoice_payment {
            self.status = TransactionStatus::Pending;
            if self.card_id.is_none() || self.invoice_month.is_none() {
                return Err(Error::Validation {
                    message: "Credit charges need both a card and an invoice month".to_string(),
                });
            }
        }

        if self.card_id.is_some() != self.invoice_month.is_some() {
            return Err(Error::Validation {
                message: "Card and invoice month must be set together".to_string(),
            });
        }
        if self.card_id.is_some() && !self.is_credit() && !self.is_invoice_payment {
            return Err(Error::Validation {
                message: "Only credit charges and invoice payments can reference a card"
                    .to_string(),
            });
        }
        if let Some(month) = &self.invoice_month {
            crate::core::calendar::parse_month_key(month)?;
        }

        if self.is_invoice_payment {
            if self.is_credit() {
                return Err(Error::Validation {
                    message: "An invoice cannot be paid with the credit card itself".to_string(),
                });
            }
            if self.card_id.is_none() {
                return Err(Error::Validation {
                    message: "Invoice payments need the card and invoice month they settle"
                        .to_string(),
                });
            }
        }

        match self.status {
            TransactionStatus::Paid => {
                if self.payment_date.is_none() {
                    self.payment_date = Some(today);
                }
            }
            TransactionStatus::Pending => self.payment_date = None,
        }

        Ok(self)
    }

    /// Builds the active model for insertion. Call [`Self::normalize`] first.
    pub fn into_active_model(self) -> Result<transaction::ActiveModel> {
        Ok(transaction::ActiveModel {
            description: Set(self.description),
            amount_cents: Set(money::positive_cents(self.amount)?),
            kind: Set(self.kind),
            category: Set(self.category),
            status: Set(self.status),
            due_date: Set(self.due_date),
            payment_date: Set(self.payment_date),
            paid_by: Set(self.paid_by),
            payment_method: Set(self.payment_method),
            expense_type: Set(self.expense_type),
            is_recurring: Set(self.is_recurring),
            series_id: Set(self.series_id),
            card_id: Set(self.card_id),
            invoice_month: Set(self.invoice_month),
            is_invoice_payment: Set(self.is_invoice_payment),
            created_at: Set(self.created_at),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::str::FromStr;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn groceries() -> NewTransaction {
        NewTransaction::new(
            "  Groceries  ",
            Decimal::from_str("120.50").unwrap(),
            TransactionKind::Expense,
            "Food",
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
        )
    }

    #[test]
    fn test_new_defaults() {
        let draft = groceries();
        assert_eq!(draft.status, TransactionStatus::Pending);
        assert_eq!(draft.paid_by, JOINT);
        assert_eq!(draft.payment_method, DEFAULT_PAYMENT_METHOD);
        assert_eq!(draft.expense_type, Some(ExpenseType::Variable));
        assert!(!draft.is_recurring);
    }

    #[test]
    fn test_normalize_trims_description() {
        let draft = groceries().normalize(today()).unwrap();
        assert_eq!(draft.description, "Groceries");
    }

    #[test]
    fn test_normalize_rejects_empty_description() {
        let draft = NewTransaction {
            description: "   ".to_string(),
            ..groceries()
        };
        assert!(matches!(
            draft.normalize(today()),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_normalize_rejects_non_positive_amount() {
        let draft = NewTransaction {
            amount: Decimal::ZERO,
            ..groceries()
        };
        assert!(matches!(
            draft.normalize(today()),
            Err(Error::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_paid_without_date_is_paid_today() {
        let draft = NewTransaction {
            status: TransactionStatus::Paid,
            ..groceries()
        }
        .normalize(today())
        .unwrap();
        assert_eq!(draft.payment_date, Some(today()));
    }

    #[test]
    fn test_pending_clears_payment_date() {
        let draft = NewTransaction {
            payment_date: Some(today()),
            ..groceries()
        }
        .normalize(today())
        .unwrap();
        assert_eq!(draft.payment_date, None);
    }

    #[test]
    fn test_income_drops_expense_type() {
        let draft = NewTransaction {
            kind: TransactionKind::Income,
            expense_type: Some(ExpenseType::Fixed),
            ..groceries()
        }
        .normalize(today())
        .unwrap();
        assert_eq!(draft.expense_type, None);
    }

    #[test]
    fn test_credit_charge_forced_pending() {
        let draft = NewTransaction {
            payment_method: CREDIT_PAYMENT_METHOD.to_string(),
            status: TransactionStatus::Paid,
            card_id: Some(1),
            invoice_month: Some("2024-04".to_string()),
            ..groceries()
        }
        .normalize(today())
        .unwrap();
        assert_eq!(draft.status, TransactionStatus::Pending);
        assert_eq!(draft.payment_date, None);
    }

    #[test]
    fn test_credit_charge_needs_card_and_month() {
        let draft = NewTransaction {
            payment_method: CREDIT_PAYMENT_METHOD.to_string(),
            card_id: Some(1),
            ..groceries()
        };
        assert!(matches!(
            draft.normalize(today()),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_card_without_month_rejected_for_any_method() {
        let draft = NewTransaction {
            card_id: Some(1),
            ..groceries()
        };
        assert!(matches!(
            draft.normalize(today()),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_invoice_month_must_be_well_formed() {
        let draft = NewTransaction {
            payment_method: CREDIT_PAYMENT_METHOD.to_string(),
            card_id: Some(1),
            invoice_month: Some("04/2024".to_string()),
            ..groceries()
        };
        assert!(matches!(
            draft.normalize(today()),
            Err(Error::InvalidMonth { .. })
        ));
    }

    #[test]
    fn test_invoice_payment_cannot_use_credit() {
        let draft = NewTransaction {
            payment_method: CREDIT_PAYMENT_METHOD.to_string(),
            card_id: Some(1),
            invoice_month: Some("2024-04".to_string()),
            is_invoice_payment: true,
            ..groceries()
        };
        assert!(matches!(
            draft.normalize(today()),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_normalize_trims_and_requires_category() {
        let draft = NewTransaction {
            category: "  Food ".to_string(),
            ..groceries()
        }
        .normalize(today())
        .unwrap();
        assert_eq!(draft.category, "Food");

        let blank = NewTransaction {
            category: "  ".to_string(),
            ..groceries()
        };
        assert!(matches!(
            blank.normalize(today()),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_card_only_on_credit_charges_and_invoice_payments() {
        let pix_with_card = NewTransaction {
            card_id: Some(1),
            invoice_month: Some("2024-03".to_string()),
            ..groceries()
        };
        assert!(matches!(
            pix_with_card.normalize(today()),
            Err(Error::Validation { .. })
        ));

        let settlement = NewTransaction {
            card_id: Some(1),
            invoice_month: Some("2024-03".to_string()),
            is_invoice_payment: true,
            ..groceries()
        };
        assert!(settlement.normalize(today()).is_ok());
    }
}
