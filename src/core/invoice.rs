//! Credit card invoices derived from the transaction set.
//!
//! Invoices are never stored. They are recomputed from the current snapshot by
//! grouping credit charges per card and invoice period; an invoice counts as
//! paid when a settling record (`is_invoice_payment`) exists for the same card
//! and period.

use crate::{
    core::{draft::NewTransaction, money},
    entities::{ExpenseType, TransactionKind, TransactionStatus, card, transaction},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Category given to invoice payments.
pub const INVOICE_PAYMENT_CATEGORY: &str = "Credit Card Expenses";

/// One card's charges for one invoice period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSummary {
    /// Card the invoice belongs to
    pub card_id: i64,
    /// Invoice period `YYYY-MM`
    pub invoice_month: String,
    /// Sum of the member charges
    pub total: Decimal,
    /// The member charges, in input order
    pub transactions: Vec<transaction::Model>,
    /// Whether a settling record exists
    pub is_paid: bool,
}

/// Restricts aggregation to a single invoice period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MonthFilter {
    /// Every period
    #[default]
    All,
    /// Only the given `YYYY-MM` period
    Month(String),
}

impl MonthFilter {
    fn accepts(&self, invoice_month: &str) -> bool {
        match self {
            Self::All => true,
            Self::Month(month) => month == invoice_month,
        }
    }
}

/// Invoices grouped by card id, then by invoice period.
pub type InvoiceMap = BTreeMap<i64, BTreeMap<String, InvoiceSummary>>;

/// Settling records indexed by (card, period).
fn payment_index(transactions: &[transaction::Model]) -> BTreeMap<(i64, &str), usize> {
    let mut index = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_invoice_payment) {
        if let (Some(card_id), Some(month)) = (tx.card_id, tx.invoice_month.as_deref()) {
            *index.entry((card_id, month)).or_insert(0) += 1;
        }
    }
    index
}

/// Groups credit charges into invoices.
///
/// Every card in `cards` gets an entry, possibly empty. Charges on cards that are
/// not in `cards` are left out, as are settling records themselves.
#[must_use]
pub fn aggregate_invoices(
    transactions: &[transaction::Model],
    cards: &[card::Model],
    filter: &MonthFilter,
) -> InvoiceMap {
    let mut invoices: InvoiceMap = cards.iter().map(|c| (c.id, BTreeMap::new())).collect();
    let payments = payment_index(transactions);

    for tx in transactions
        .iter()
        .filter(|tx| tx.is_credit_charge() && !tx.is_invoice_payment)
    {
        let (Some(card_id), Some(month)) = (tx.card_id, tx.invoice_month.as_deref()) else {
            continue;
        };
        if !filter.accepts(month) {
            continue;
        }
        let Some(card_invoices) = invoices.get_mut(&card_id) else {
            continue;
        };
        let summary = card_invoices
            .entry(month.to_string())
            .or_insert_with(|| InvoiceSummary {
                card_id,
                invoice_month: month.to_string(),
                total: Decimal::ZERO,
                transactions: Vec::new(),
                is_paid: payments.contains_key(&(card_id, month)),
            });
        summary.total += tx.amount();
        summary.transactions.push(tx.clone());
    }

    invoices
}

/// A card together with its invoices, newest period first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInvoices {
    /// The card
    pub card: card::Model,
    /// Invoices sorted descending by period
    pub invoices: Vec<InvoiceSummary>,
}

/// Invoice page view: cards sorted by name, each with its invoices newest first.
#[must_use]
pub fn card_invoices(
    transactions: &[transaction::Model],
    cards: &[card::Model],
    filter: &MonthFilter,
) -> Vec<CardInvoices> {
    let mut grouped = aggregate_invoices(transactions, cards, filter);
    let mut sorted_cards: Vec<&card::Model> = cards.iter().collect();
    sorted_cards.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    sorted_cards
        .into_iter()
        .map(|card| CardInvoices {
            card: card.clone(),
            invoices: grouped
                .remove(&card.id)
                .map(|months| months.into_values().rev().collect())
                .unwrap_or_default(),
        })
        .collect()
}

/// Distinct invoice periods of all credit charges, newest first.
#[must_use]
pub fn available_invoice_months(transactions: &[transaction::Model]) -> Vec<String> {
    let months: BTreeSet<&str> = transactions
        .iter()
        .filter(|tx| tx.is_credit_charge())
        .filter_map(|tx| tx.invoice_month.as_deref())
        .collect();
    months.into_iter().rev().map(str::to_string).collect()
}

/// Whether a settling record exists for the card and period.
#[must_use]
pub fn is_invoice_paid(
    transactions: &[transaction::Model],
    card_id: i64,
    invoice_month: &str,
) -> bool {
    transactions.iter().any(|tx| {
        tx.is_invoice_payment
            && tx.card_id == Some(card_id)
            && tx.invoice_month.as_deref() == Some(invoice_month)
    })
}

/// Sum of the credit charges of one invoice, whether or not it is paid.
#[must_use]
pub fn invoice_total(
    transactions: &[transaction::Model],
    card_id: i64,
    invoice_month: &str,
) -> Decimal {
    money::sum_cents(
        transactions
            .iter()
            .filter(|tx| {
                tx.is_credit_charge()
                    && !tx.is_invoice_payment
                    && tx.card_id == Some(card_id)
                    && tx.invoice_month.as_deref() == Some(invoice_month)
            })
            .map(|tx| tx.amount_cents),
    )
}

/// Builds the single settling record for an invoice.
///
/// The record is a paid fixed expense for the invoice total, carrying the card
/// and period it settles. `payment_method` must not be credit.
#[must_use]
pub fn build_invoice_payment(
    card: &card::Model,
    invoice_month: &str,
    total: Decimal,
    paid_by: &str,
    payment_method: &str,
    today: NaiveDate,
) -> NewTransaction {
    NewTransaction {
        status: TransactionStatus::Paid,
        payment_date: Some(today),
        paid_by: paid_by.to_string(),
        payment_method: payment_method.to_string(),
        expense_type: Some(ExpenseType::Fixed),
        card_id: Some(card.id),
        invoice_month: Some(invoice_month.to_string()),
        is_invoice_payment: true,
        ..NewTransaction::new(
            format!("Invoice {} - {invoice_month}", card.name),
            total,
            TransactionKind::Expense,
            INVOICE_PAYMENT_CATEGORY,
            today,
        )
    }
}

/// (card, period) pairs that have more than one settling record.
///
/// Persistence refuses a second payment, but records written elsewhere (imports,
/// older data) can still contain duplicates.
#[must_use]
pub fn duplicate_invoice_payments(transactions: &[transaction::Model]) -> Vec<(i64, String)> {
    payment_index(transactions)
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|((card_id, month), _)| (card_id, month.to_string()))
        .collect()
}
