//! Transaction business logic - Handles every write to the transaction collection.
//!
//! Single records, installment purchases, recurring fan-out, subscription
//! cancellation and invoice payments all go through here. Anything that writes
//! more than one row does so inside one database transaction, so a failure
//! halfway leaves nothing behind and the error reaches the caller.

use crate::{
    config::settings::AppConfig,
    core::{
        calendar,
        card::get_card_by_id,
        draft::NewTransaction,
        installment::split_into_installments,
        invoice::{build_invoice_payment, invoice_total},
        invoice_cycle::calculate_invoice_month,
        money,
        payment_method::ensure_payment_method,
        recurrence::{
            SubscriptionKey, cancellation_targets, project_future_occurrences, should_project,
        },
    },
    entities::{ExpenseType, Transaction, TransactionKind, TransactionStatus, transaction},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Fills in the invoice period of a credit charge from its card's closing day.
///
/// Drafts that are not credit charges, or already carry a period, are returned as is.
async fn stamp_invoice_month<C: ConnectionTrait>(
    db: &C,
    mut draft: NewTransaction,
) -> Result<NewTransaction> {
    if !draft.is_credit() || draft.is_invoice_payment || draft.invoice_month.is_some() {
        return Ok(draft);
    }
    let Some(card_id) = draft.card_id else {
        return Ok(draft);
    };
    let card = get_card_by_id(db, card_id)
        .await?
        .ok_or(Error::CardNotFound { id: card_id })?;
    draft.invoice_month = Some(calculate_invoice_month(draft.due_date, card.closing_day));
    Ok(draft)
}

/// Creates a transaction, and for a recurring base also its future occurrences.
///
/// The draft is normalized first and its payer checked against the configured
/// partners. Credit charges get their invoice period from the card when none is
/// given. A recurring, non-credit base is stored together with
/// `recurrence_horizon_months` pending copies, all sharing the base id as
/// `series_id`.
///
/// # Returns
/// The stored records, base first.
#[instrument(skip(db, draft, config), fields(description = %draft.description))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    draft: NewTransaction,
    config: &AppConfig,
) -> Result<Vec<transaction::Model>> {
    money::positive_cents(draft.amount)?;
    config.check_payer(&draft.paid_by)?;
    let draft = stamp_invoice_month(db, draft).await?.normalize(today())?;
    ensure_payment_method(db, &draft.payment_method).await?;

    let txn = db.begin().await?;
    let base = draft.clone().into_active_model()?.insert(&txn).await?;
    let mut created = vec![base];

    if should_project(&draft) {
        let series_id = created[0].id;
        let mut base: transaction::ActiveModel = created[0].clone().into();
        base.series_id = Set(Some(series_id));
        created[0] = base.update(&txn).await?;

        let occurrences =
            project_future_occurrences(&draft, config.recurrence_horizon_months, Utc::now());
        for occurrence in occurrences {
            let occurrence = NewTransaction {
                series_id: Some(series_id),
                ..occurrence
            };
            created.push(occurrence.into_active_model()?.insert(&txn).await?);
        }
    }

    txn.commit().await?;

    info!(
        "Created transaction {} ({} projected occurrence(s))",
        created[0].id,
        created.len() - 1
    );
    Ok(created)
}

/// Stores several independent drafts in one database transaction.
///
/// No recurrence fan-out happens here; this is the batch path for imports.
pub async fn create_transactions(
    db: &DatabaseConnection,
    drafts: Vec<NewTransaction>,
    config: &AppConfig,
) -> Result<Vec<transaction::Model>> {
    let today = today();
    let mut normalized = Vec::with_capacity(drafts.len());
    for draft in drafts {
        config.check_payer(&draft.paid_by)?;
        let draft = stamp_invoice_month(db, draft).await?.normalize(today)?;
        ensure_payment_method(db, &draft.payment_method).await?;
        normalized.push(draft);
    }

    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(normalized.len());
    for draft in normalized {
        created.push(draft.into_active_model()?.insert(&txn).await?);
    }
    txn.commit().await?;

    debug!("Stored batch of {} transaction(s)", created.len());
    Ok(created)
}

/// Creates a credit purchase split into `count` monthly installments.
///
/// Each installment gets its own due date and invoice period from the card's
/// closing day. All of them are stored or none is.
#[instrument(skip(db, draft, config), fields(description = %draft.description))]
pub async fn create_installment_purchase(
    db: &DatabaseConnection,
    draft: NewTransaction,
    count: u32,
    config: &AppConfig,
) -> Result<Vec<transaction::Model>> {
    if count == 0 {
        return Err(Error::InvalidInstallmentCount {
            count,
            amount: draft.amount,
        });
    }
    money::positive_cents(draft.amount)?;
    config.check_payer(&draft.paid_by)?;
    let card_id = match (draft.is_credit(), draft.card_id) {
        (true, Some(card_id)) => card_id,
        _ => {
            return Err(Error::Validation {
                message: "Installments are only available for credit card purchases".to_string(),
            });
        }
    };

    let card = get_card_by_id(db, card_id)
        .await?
        .ok_or(Error::CardNotFound { id: card_id })?;
    let records = split_into_installments(
        draft.amount,
        count,
        draft.due_date,
        draft.description.trim(),
        card.closing_day,
    )?;

    let today = today();
    let mut drafts = Vec::with_capacity(records.len());
    for record in records {
        drafts.push(
            NewTransaction {
                description: record.description,
                amount: record.amount,
                due_date: record.due_date,
                invoice_month: Some(record.invoice_month),
                is_recurring: false,
                series_id: None,
                ..draft.clone()
            }
            .normalize(today)?,
        );
    }

    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(drafts.len());
    for draft in drafts {
        created.push(draft.into_active_model()?.insert(&txn).await?);
    }
    txn.commit().await?;

    info!(
        "Created {} installment(s) on card '{}'",
        created.len(),
        card.name
    );
    Ok(created)
}

/// Retrieves every transaction, newest due date first.
pub async fn get_all_transactions<C: ConnectionTrait>(db: &C) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .order_by_desc(transaction::Column::DueDate)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific transaction by its unique ID.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fields an edit may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionUpdate {
    /// New description
    pub description: Option<String>,
    /// New amount
    pub amount: Option<Decimal>,
    /// New category
    pub category: Option<String>,
    /// New due date; credit charges get their invoice period recomputed
    pub due_date: Option<NaiveDate>,
    /// New payer
    pub paid_by: Option<String>,
    /// New expense type, `Some(None)` clears it
    pub expense_type: Option<Option<ExpenseType>>,
    /// New recurring flag
    pub is_recurring: Option<bool>,
}

/// Applies a partial edit. Last writer wins; no version check is made.
#[instrument(skip(db, changes, config))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    changes: TransactionUpdate,
    config: &AppConfig,
) -> Result<transaction::Model> {
    let existing = get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;
    let is_credit_charge = existing.is_credit_charge() && !existing.is_invoice_payment;
    let kind = existing.kind;
    let card_id = existing.card_id;
    let mut active: transaction::ActiveModel = existing.into();

    if let Some(description) = changes.description {
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(Error::Validation {
                message: "Description cannot be empty".to_string(),
            });
        }
        active.description = Set(description);
    }
    if let Some(amount) = changes.amount {
        active.amount_cents = Set(money::positive_cents(amount)?);
    }
    if let Some(category) = changes.category {
        let category = category.trim().to_string();
        if category.is_empty() {
            return Err(Error::Validation {
                message: "Category cannot be empty".to_string(),
            });
        }
        active.category = Set(category);
    }
    if let Some(due_date) = changes.due_date {
        active.due_date = Set(due_date);
        if let (true, Some(card_id)) = (is_credit_charge, card_id) {
            // A deleted card keeps the old period.
            if let Some(card) = get_card_by_id(db, card_id).await? {
                active.invoice_month =
                    Set(Some(calculate_invoice_month(due_date, card.closing_day)));
            }
        }
    }
    if let Some(paid_by) = changes.paid_by {
        config.check_payer(&paid_by)?;
        active.paid_by = Set(paid_by);
    }
    if let Some(expense_type) = changes.expense_type {
        active.expense_type = Set(expense_type);
    }
    if kind == TransactionKind::Income {
        active.expense_type = Set(None);
    }
    if let Some(is_recurring) = changes.is_recurring {
        active.is_recurring = Set(is_recurring);
    }

    let updated = active.update(db).await?;
    info!("Updated transaction {}", updated.id);
    Ok(updated)
}

/// Marks a pending transaction as paid.
///
/// Credit charges are refused; they are settled by paying their invoice.
#[instrument(skip(db))]
pub async fn mark_as_paid(
    db: &DatabaseConnection,
    transaction_id: i64,
    payment_date: NaiveDate,
    payment_method: Option<String>,
) -> Result<transaction::Model> {
    let existing = get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;
    if existing.is_credit_charge() && !existing.is_invoice_payment {
        return Err(Error::CreditSettledByInvoice { id: transaction_id });
    }
    if payment_method.as_deref() == Some(transaction::CREDIT_PAYMENT_METHOD) {
        return Err(Error::Validation {
            message: "Use a credit purchase and pay the invoice instead".to_string(),
        });
    }
    if let Some(method) = &payment_method {
        ensure_payment_method(db, method).await?;
    }

    let mut active: transaction::ActiveModel = existing.into();
    active.status = Set(TransactionStatus::Paid);
    active.payment_date = Set(Some(payment_date));
    if let Some(method) = payment_method {
        active.payment_method = Set(method);
    }

    let updated = active.update(db).await?;
    info!("Transaction {} paid on {}", updated.id, payment_date);
    Ok(updated)
}

/// Deletes a transaction.
#[instrument(skip(db))]
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let result = Transaction::delete_by_id(transaction_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::TransactionNotFound { id: transaction_id });
    }
    info!("Deleted transaction {}", transaction_id);
    Ok(())
}

/// Cancels a subscription by deleting its pending occurrences due on or after `today`.
///
/// Paid and past occurrences are kept.
///
/// # Returns
/// The number of deleted occurrences.
#[instrument(skip(db))]
pub async fn cancel_subscription(
    db: &DatabaseConnection,
    key: &SubscriptionKey,
    today: NaiveDate,
) -> Result<u64> {
    let txn = db.begin().await?;

    let candidates = Transaction::find()
        .filter(transaction::Column::IsRecurring.eq(true))
        .filter(transaction::Column::Status.eq(TransactionStatus::Pending))
        .filter(transaction::Column::DueDate.gte(today))
        .all(&txn)
        .await?;
    let targets = cancellation_targets(&candidates, key, today);
    if targets.is_empty() {
        txn.commit().await?;
        return Ok(0);
    }

    let result = Transaction::delete_many()
        .filter(transaction::Column::Id.is_in(targets))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    info!(
        "Cancelled subscription {:?}: {} future occurrence(s) removed",
        key, result.rows_affected
    );
    Ok(result.rows_affected)
}

/// Pays a card's invoice with a single settling transaction.
///
/// The invoice is re-read inside the database transaction. A second payment for
/// the same card and period is refused with [`Error::InvoiceAlreadyPaid`], an
/// invoice without charges with [`Error::EmptyInvoice`]. Charges themselves are
/// never modified.
#[instrument(skip(db, config))]
pub async fn pay_invoice(
    db: &DatabaseConnection,
    card_id: i64,
    invoice_month: &str,
    paid_by: &str,
    payment_method: &str,
    config: &AppConfig,
) -> Result<transaction::Model> {
    calendar::parse_month_key(invoice_month)?;
    config.check_payer(paid_by)?;
    if payment_method == transaction::CREDIT_PAYMENT_METHOD {
        return Err(Error::Validation {
            message: "An invoice cannot be paid with the credit card itself".to_string(),
        });
    }
    ensure_payment_method(db, payment_method).await?;

    let txn = db.begin().await?;

    let card = get_card_by_id(&txn, card_id)
        .await?
        .ok_or(Error::CardNotFound { id: card_id })?;
    let members = Transaction::find()
        .filter(transaction::Column::CardId.eq(card_id))
        .filter(transaction::Column::InvoiceMonth.eq(invoice_month))
        .all(&txn)
        .await?;

    if members.iter().any(|tx| tx.is_invoice_payment) {
        return Err(Error::InvoiceAlreadyPaid {
            card_id,
            invoice_month: invoice_month.to_string(),
        });
    }
    let total = invoice_total(&members, card_id, invoice_month);
    if total <= Decimal::ZERO {
        return Err(Error::EmptyInvoice {
            card_id,
            invoice_month: invoice_month.to_string(),
        });
    }

    let today = today();
    let payment =
        build_invoice_payment(&card, invoice_month, total, paid_by, payment_method, today)
            .normalize(today)?
            .into_active_model()?
            .insert(&txn)
            .await?;
    txn.commit().await?;

    info!(
        "Paid invoice {} of card '{}': {}",
        invoice_month, card.name, total
    );
    Ok(payment)
}
