//! Recurring transactions: future-occurrence projection and subscription views.
//!
//! A recurring base fans out into one pending copy per following month. The base
//! and its copies share a `series_id` (the base's id), which is how they are
//! grouped into a subscription afterwards. Records created before series ids
//! existed, or imported ones, fall back to grouping by description.

use crate::{
    core::{
        calendar::{add_months, first_of_month, last_of_month, month_key},
        draft::NewTransaction,
        money,
    },
    entities::{TransactionKind, TransactionStatus, transaction},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Number of months projected when nothing else is configured.
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// Whether a newly created transaction should fan out future occurrences.
///
/// Credit charges never recur this way; their repetition is a card concern.
#[must_use]
pub fn should_project(base: &NewTransaction) -> bool {
    base.is_recurring && !base.is_credit() && !base.is_invoice_payment
}

/// Generates `horizon_months` pending copies of `base`, one per following month.
///
/// Copy `i` (1-based) is due `i` months after the base due date, always computed
/// from the base date so a clamp in a short month does not carry over. Copies have
/// no payment date and are stamped with `now`. The base itself is not included.
#[must_use]
pub fn project_future_occurrences(
    base: &NewTransaction,
    horizon_months: u32,
    now: DateTime<Utc>,
) -> Vec<NewTransaction> {
    (1..=horizon_months)
        .map(|offset| NewTransaction {
            due_date: add_months(base.due_date, offset),
            status: TransactionStatus::Pending,
            payment_date: None,
            created_at: now,
            ..base.clone()
        })
        .collect()
}

/// What ties the occurrences of one subscription together.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubscriptionKey {
    /// Explicit series shared by a base and its projected copies
    Series(i64),
    /// Legacy grouping for records without a series
    Description(String),
}

impl SubscriptionKey {
    /// Key of a stored transaction.
    #[must_use]
    pub fn of(tx: &transaction::Model) -> Self {
        match tx.series_id {
            Some(series_id) => Self::Series(series_id),
            None => Self::Description(tx.description.clone()),
        }
    }

    /// Whether `tx` belongs to the subscription with this key.
    #[must_use]
    pub fn matches(&self, tx: &transaction::Model) -> bool {
        tx.is_recurring && Self::of(tx) == *self
    }
}

/// An active subscription, built from its stored occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Grouping key
    pub key: SubscriptionKey,
    /// Description of the next occurrence
    pub description: String,
    /// Category of the next occurrence
    pub category: String,
    /// Amount of the next occurrence
    pub amount: Decimal,
    /// Income or expense
    pub kind: TransactionKind,
    /// Who pays it
    pub paid_by: String,
    /// Every occurrence id, past and future
    pub transaction_ids: Vec<i64>,
    /// Earliest pending due date on or after today
    pub next_due_date: NaiveDate,
    /// Number of pending occurrences on or after today
    pub future_count: usize,
}

/// Groups recurring transactions into subscriptions that still have future
/// pending occurrences, sorted by next due date.
#[must_use]
pub fn active_subscriptions(
    transactions: &[transaction::Model],
    today: NaiveDate,
) -> Vec<Subscription> {
    let mut groups: BTreeMap<SubscriptionKey, Vec<&transaction::Model>> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_recurring) {
        groups.entry(SubscriptionKey::of(tx)).or_default().push(tx);
    }

    let mut subscriptions: Vec<Subscription> = groups
        .into_iter()
        .filter_map(|(key, members)| {
            let future: Vec<&&transaction::Model> = members
                .iter()
                .filter(|tx| tx.is_pending() && tx.due_date >= today)
                .collect();
            let next = future.iter().min_by_key(|tx| (tx.due_date, tx.id))?;
            Some(Subscription {
                description: next.description.clone(),
                category: next.category.clone(),
                amount: next.amount(),
                kind: next.kind,
                paid_by: next.paid_by.clone(),
                next_due_date: next.due_date,
                future_count: future.len(),
                transaction_ids: members.iter().map(|tx| tx.id).collect(),
                key,
            })
        })
        .collect();

    subscriptions.sort_by(|a, b| {
        a.next_due_date
            .cmp(&b.next_due_date)
            .then_with(|| a.description.cmp(&b.description))
    });
    subscriptions
}

/// Sum of one occurrence per active subscription.
#[must_use]
pub fn monthly_commitment(subscriptions: &[Subscription]) -> Decimal {
    subscriptions.iter().map(|sub| sub.amount).sum()
}

/// Recurring expenses due in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyCommitment {
    /// `YYYY-MM`
    pub month: String,
    /// Sum of the recurring expenses due that month
    pub total: Decimal,
    /// How many there are
    pub count: usize,
}

/// Recurring expenses per month for `months` months starting with the month of `today`.
#[must_use]
pub fn future_commitments(
    transactions: &[transaction::Model],
    today: NaiveDate,
    months: u32,
) -> Vec<MonthlyCommitment> {
    let start = first_of_month(today);
    (0..months)
        .map(|offset| {
            let month_start = add_months(start, offset);
            let month_end = last_of_month(month_start);
            let due: Vec<&transaction::Model> = transactions
                .iter()
                .filter(|tx| {
                    tx.is_recurring
                        && tx.kind == TransactionKind::Expense
                        && (month_start..=month_end).contains(&tx.due_date)
                })
                .collect();
            MonthlyCommitment {
                month: month_key(month_start),
                total: money::sum_cents(due.iter().map(|tx| tx.amount_cents)),
                count: due.len(),
            }
        })
        .collect()
}

/// Ids of the occurrences cancelling a subscription removes: pending ones due
/// today or later. Paid and past occurrences are kept.
#[must_use]
pub fn cancellation_targets(
    transactions: &[transaction::Model],
    key: &SubscriptionKey,
    today: NaiveDate,
) -> Vec<i64> {
    transactions
        .iter()
        .filter(|tx| key.matches(tx) && tx.is_pending() && tx.due_date >= today)
        .map(|tx| tx.id)
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::transaction::CREDIT_PAYMENT_METHOD;
    use crate::test_utils::stored_transaction;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn netflix(due: NaiveDate) -> NewTransaction {
        NewTransaction {
            is_recurring: true,
            status: TransactionStatus::Paid,
            payment_date: Some(due),
            ..NewTransaction::new(
                "Netflix",
                Decimal::from_str("55.90").unwrap(),
                TransactionKind::Expense,
                "Leisure",
                due,
            )
        }
    }

    #[test]
    fn test_projects_exactly_horizon_pending_copies() {
        let base = netflix(date(2024, 1, 15));
        let now = Utc::now();
        let copies = project_future_occurrences(&base, 12, now);

        assert_eq!(copies.len(), 12);
        let mut previous = base.due_date;
        for (i, copy) in copies.iter().enumerate() {
            assert_eq!(copy.status, TransactionStatus::Pending);
            assert_eq!(copy.payment_date, None);
            assert_eq!(copy.created_at, now);
            assert!(copy.due_date > previous);
            assert_ne!(copy.due_date, base.due_date);
            assert_eq!(copy.due_date, add_months(base.due_date, i as u32 + 1));
            assert_eq!(copy.description, base.description);
            assert_eq!(copy.amount, base.amount);
            previous = copy.due_date;
        }
    }

    #[test]
    fn test_projection_from_month_end_clamps_per_month() {
        let copies = project_future_occurrences(&netflix(date(2024, 1, 31)), 3, Utc::now());
        let dues: Vec<NaiveDate> = copies.iter().map(|c| c.due_date).collect();
        assert_eq!(
            dues,
            vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]
        );
    }

    #[test]
    fn test_zero_horizon_projects_nothing() {
        let base = netflix(date(2024, 1, 1));
        assert!(project_future_occurrences(&base, 0, Utc::now()).is_empty());
    }

    #[test]
    fn test_should_project_only_recurring_non_credit() {
        let base = netflix(date(2024, 1, 1));
        assert!(should_project(&base));

        let one_off = NewTransaction {
            is_recurring: false,
            ..base.clone()
        };
        assert!(!should_project(&one_off));

        let on_card = NewTransaction {
            payment_method: CREDIT_PAYMENT_METHOD.to_string(),
            card_id: Some(1),
            invoice_month: Some("2024-01".to_string()),
            ..base
        };
        assert!(!should_project(&on_card));
    }

    fn series(
        id: i64,
        series_id: Option<i64>,
        description: &str,
        due: NaiveDate,
        paid: bool,
    ) -> transaction::Model {
        let mut tx = stored_transaction(id, description, "55.90", due);
        tx.is_recurring = true;
        tx.series_id = series_id;
        if paid {
            tx.status = TransactionStatus::Paid;
            tx.payment_date = Some(due);
        }
        tx
    }

    #[test]
    fn test_active_subscriptions_group_by_series_then_description() {
        let today = date(2024, 3, 10);
        let txs = vec![
            series(1, Some(1), "Netflix", date(2024, 2, 15), true),
            series(2, Some(1), "Netflix", date(2024, 3, 15), false),
            series(3, Some(1), "Netflix (renamed)", date(2024, 4, 15), false),
            series(4, None, "Gym", date(2024, 3, 12), false),
            series(5, None, "Gym", date(2024, 4, 12), false),
            // Same description as the series, but a separate legacy group.
            series(6, None, "Netflix", date(2024, 1, 15), true),
        ];

        let subs = active_subscriptions(&txs, today);
        assert_eq!(subs.len(), 2);

        assert_eq!(subs[0].key, SubscriptionKey::Description("Gym".to_string()));
        assert_eq!(subs[0].next_due_date, date(2024, 3, 12));
        assert_eq!(subs[0].future_count, 2);

        assert_eq!(subs[1].key, SubscriptionKey::Series(1));
        assert_eq!(subs[1].description, "Netflix");
        assert_eq!(subs[1].future_count, 2);
        assert_eq!(subs[1].transaction_ids, vec![1, 2, 3]);

        assert_eq!(monthly_commitment(&subs), Decimal::from_str("111.80").unwrap());
    }

    #[test]
    fn test_future_commitments_counts_recurring_expenses_per_month() {
        let today = date(2024, 3, 20);
        let mut salary = series(9, Some(9), "Salary", date(2024, 3, 5), false);
        salary.kind = TransactionKind::Income;
        let txs = vec![
            series(1, Some(1), "Netflix", date(2024, 3, 15), true),
            series(2, Some(1), "Netflix", date(2024, 4, 15), false),
            series(4, None, "Gym", date(2024, 4, 30), false),
            salary,
            stored_transaction(10, "Groceries", "300", date(2024, 3, 25)),
        ];

        let projection = future_commitments(&txs, today, 3);
        assert_eq!(projection.len(), 3);
        assert_eq!(projection[0].month, "2024-03");
        assert_eq!(projection[0].count, 1);
        assert_eq!(projection[1].month, "2024-04");
        assert_eq!(projection[1].count, 2);
        assert_eq!(projection[1].total, Decimal::from_str("111.80").unwrap());
        assert_eq!(projection[2].month, "2024-05");
        assert_eq!(projection[2].total, Decimal::ZERO);
    }

    #[test]
    fn test_cancellation_targets_only_future_pending() {
        let today = date(2024, 3, 15);
        let txs = vec![
            series(1, Some(1), "Netflix", date(2024, 2, 15), true),
            series(2, Some(1), "Netflix", date(2024, 3, 1), false),
            series(3, Some(1), "Netflix", date(2024, 3, 15), false),
            series(4, Some(1), "Netflix", date(2024, 4, 15), false),
            series(5, Some(1), "Netflix", date(2024, 5, 15), true),
            series(6, None, "Netflix", date(2024, 4, 15), false),
        ];
        let targets = cancellation_targets(&txs, &SubscriptionKey::Series(1), today);
        assert_eq!(targets, vec![3, 4]);

        let legacy = cancellation_targets(
            &txs,
            &SubscriptionKey::Description("Netflix".to_string()),
            today,
        );
        assert_eq!(legacy, vec![6]);
    }
}
