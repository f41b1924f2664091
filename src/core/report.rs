//! Report generation business logic.
//!
//! Dashboard figures, overdue and pending lists, and spending per category. The
//! functions work on a slice of transactions and return structured data for a
//! front end to format.

use crate::{
    core::{budget, calendar, money, recurrence},
    entities::{TransactionKind, TransactionStatus, transaction},
    errors::Result,
    store::LedgerSnapshot,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;

/// Date a transaction counts on: its payment date if paid, otherwise its due date.
#[must_use]
pub fn effective_date(tx: &transaction::Model) -> NaiveDate {
    tx.payment_date.unwrap_or(tx.due_date)
}

/// Monthly totals shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    /// `YYYY-MM`
    pub month: String,
    /// Paid income in the month
    pub income: Decimal,
    /// Paid expenses in the month
    pub expenses: Decimal,
    /// `income - expenses`, may be negative
    pub balance: Decimal,
    /// Pending expenses due in the month
    pub pending: Decimal,
}

/// Computes the dashboard totals for the month containing `month`.
#[must_use]
pub fn dashboard_summary(
    transactions: &[transaction::Model],
    month: NaiveDate,
) -> DashboardSummary {
    let start = calendar::first_of_month(month);
    let end = calendar::last_of_month(month);
    let in_month = |date: NaiveDate| (start..=end).contains(&date);

    let (mut income, mut expenses, mut pending) = (0_i64, 0_i64, 0_i64);
    for tx in transactions {
        match (tx.kind, tx.status) {
            (TransactionKind::Income, TransactionStatus::Paid) if in_month(effective_date(tx)) => {
                income += tx.amount_cents;
            }
            (TransactionKind::Expense, TransactionStatus::Paid) if in_month(effective_date(tx)) => {
                expenses += tx.amount_cents;
            }
            (TransactionKind::Expense, TransactionStatus::Pending) if in_month(tx.due_date) => {
                pending += tx.amount_cents;
            }
            _ => {}
        }
    }

    DashboardSummary {
        month: calendar::month_key(start),
        income: money::from_cents(income),
        expenses: money::from_cents(expenses),
        balance: money::from_cents(income - expenses),
        pending: money::from_cents(pending),
    }
}

/// Pending bills due before `today`, oldest first. Credit charges are excluded
/// since they are paid through their invoice.
#[must_use]
pub fn overdue_transactions(
    transactions: &[transaction::Model],
    today: NaiveDate,
) -> Vec<&transaction::Model> {
    let mut overdue: Vec<&transaction::Model> = transactions
        .iter()
        .filter(|tx| tx.is_pending() && tx.due_date < today && !tx.is_credit_charge())
        .collect();
    overdue.sort_by_key(|tx| (tx.due_date, tx.id));
    overdue
}

/// Pending transactions other than credit charges, by due date.
#[must_use]
pub fn pending_transactions(transactions: &[transaction::Model]) -> Vec<&transaction::Model> {
    let mut pending: Vec<&transaction::Model> = transactions
        .iter()
        .filter(|tx| tx.is_pending() && !tx.is_credit_charge())
        .collect();
    pending.sort_by_key(|tx| (tx.due_date, tx.id));
    pending
}

/// Paid expenses in the month, per category.
///
/// Invoice payments are left out: the card purchases they settle are what the
/// money was spent on.
#[must_use]
pub fn spend_by_category(
    transactions: &[transaction::Model],
    month: NaiveDate,
) -> BTreeMap<String, Decimal> {
    let start = calendar::first_of_month(month);
    let end = calendar::last_of_month(month);

    let mut cents: BTreeMap<String, i64> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| {
        tx.kind == TransactionKind::Expense
            && tx.status == TransactionStatus::Paid
            && !tx.is_invoice_payment
            && (start..=end).contains(&effective_date(tx))
    }) {
        *cents.entry(tx.category.clone()).or_insert(0) += tx.amount_cents;
    }
    cents
        .into_iter()
        .map(|(category, total)| (category, money::from_cents(total)))
        .collect()
}

/// Everything the dashboard shows for one day.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    /// Monthly totals
    pub summary: DashboardSummary,
    /// Overdue bills
    pub overdue: Vec<transaction::Model>,
    /// Sum of the overdue bills
    pub overdue_total: Decimal,
    /// Spending per category this month
    pub spend_by_category: BTreeMap<String, Decimal>,
    /// Budget usage this month
    pub budget: budget::BudgetOverview,
    /// Sum of one occurrence per active subscription
    pub monthly_commitment: Decimal,
}

/// Builds the dashboard for `today` from a snapshot plus the stored budgets.
///
/// # Arguments
/// * `db` - Database connection, used for the budgets
/// * `snapshot` - Current transactions and cards
/// * `today` - Reference day; its month is the reported month
pub async fn generate_dashboard_report(
    db: &DatabaseConnection,
    snapshot: &LedgerSnapshot,
    today: NaiveDate,
) -> Result<DashboardReport> {
    let transactions = &snapshot.transactions;
    let budgets = budget::get_budgets(db).await?;

    let overdue: Vec<transaction::Model> = overdue_transactions(transactions, today)
        .into_iter()
        .cloned()
        .collect();
    let overdue_total = money::sum_cents(overdue.iter().map(|tx| tx.amount_cents));
    let subscriptions = recurrence::active_subscriptions(transactions, today);

    Ok(DashboardReport {
        summary: dashboard_summary(transactions, today),
        overdue,
        overdue_total,
        spend_by_category: spend_by_category(transactions, today),
        budget: budget::budget_progress(&budgets, transactions, today),
        monthly_commitment: recurrence::monthly_commitment(&subscriptions),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn paid(mut tx: transaction::Model, on: NaiveDate) -> transaction::Model {
        tx.status = TransactionStatus::Paid;
        tx.payment_date = Some(on);
        tx
    }

    fn fixture() -> Vec<transaction::Model> {
        let mut salary = paid(
            stored_transaction(1, "Salary", "5000", date(2024, 3, 5)),
            date(2024, 3, 5),
        );
        salary.kind = TransactionKind::Income;
        salary.category = "Salary".to_string();
        salary.expense_type = None;

        let mut rent = paid(
            stored_transaction(2, "Rent", "1500", date(2024, 3, 10)),
            date(2024, 3, 10),
        );
        rent.category = "Housing".to_string();

        // Due in February, paid in March: counts for March.
        let late_water = paid(
            stored_transaction(3, "Water", "60", date(2024, 2, 25)),
            date(2024, 3, 2),
        );
        let electricity = stored_transaction(4, "Electricity", "210.40", date(2024, 3, 8));
        let internet = stored_transaction(5, "Internet", "99.90", date(2024, 3, 28));
        let old_bill = stored_transaction(6, "Old bill", "30", date(2024, 2, 1));
        let charge = stored_credit_charge(7, 1, "2024-03", "400");

        let mut invoice = paid(
            stored_transaction(8, "Invoice Visa - 2024-02", "350", date(2024, 3, 12)),
            date(2024, 3, 12),
        );
        invoice.is_invoice_payment = true;
        invoice.card_id = Some(1);
        invoice.invoice_month = Some("2024-02".to_string());

        vec![
            salary,
            rent,
            late_water,
            electricity,
            internet,
            old_bill,
            charge,
            invoice,
        ]
    }

    #[test]
    fn test_dashboard_summary() {
        let summary = dashboard_summary(&fixture(), date(2024, 3, 15));
        assert_eq!(summary.month, "2024-03");
        assert_eq!(summary.income, dec("5000"));
        assert_eq!(summary.expenses, dec("1910"));
        assert_eq!(summary.balance, dec("3090"));
        // Electricity, internet and the credit charge due in March.
        assert_eq!(summary.pending, dec("710.30"));
    }

    #[test]
    fn test_overdue_excludes_credit_and_future() {
        let txs = fixture();
        let overdue = overdue_transactions(&txs, date(2024, 3, 15));
        let ids: Vec<i64> = overdue.iter().map(|tx| tx.id).collect();
        assert_eq!(ids, vec![6, 4]);
    }

    #[test]
    fn test_pending_excludes_credit() {
        let txs = fixture();
        let ids: Vec<i64> = pending_transactions(&txs).iter().map(|tx| tx.id).collect();
        assert_eq!(ids, vec![6, 4, 5]);
    }

    #[test]
    fn test_spend_by_category_skips_invoice_payments() {
        let spend = spend_by_category(&fixture(), date(2024, 3, 1));
        assert_eq!(spend.len(), 2);
        assert_eq!(spend["Housing"], dec("1500"));
        assert_eq!(spend["Food"], dec("60"));
    }

    #[tokio::test]
    async fn test_generate_dashboard_report() -> Result<()> {
        let db = setup_test_db().await?;
        let snapshot = LedgerSnapshot {
            transactions: fixture(),
            cards: vec![stored_card(1, "Visa", 10)],
        };
        let report = generate_dashboard_report(&db, &snapshot, date(2024, 3, 15)).await?;
        assert_eq!(report.overdue.len(), 2);
        assert_eq!(report.overdue_total, dec("240.40"));
        assert_eq!(report.summary.income, dec("5000"));
        assert_eq!(report.budget.total_budget, Decimal::ZERO);
        assert_eq!(report.monthly_commitment, Decimal::ZERO);
        Ok(())
    }
}
