//! Monthly budgets per category.
//!
//! Each category has at most one monthly budget. Progress compares it against
//! what was actually paid out in the month; pending bills and credit charges do
//! not count until they are paid.

use crate::{
    core::{calendar, money, report::effective_date},
    entities::{Budget, TransactionKind, TransactionStatus, budget, transaction},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Sets the monthly budget of `category`, replacing any previous value.
///
/// A zero amount is allowed and means "no budget".
#[instrument(skip(db))]
pub async fn set_budget(
    db: &DatabaseConnection,
    category: String,
    amount: Decimal,
) -> Result<budget::Model> {
    let amount_cents = money::to_cents(amount)?;
    if amount_cents < 0 {
        return Err(Error::InvalidAmount { amount });
    }
    crate::core::category::get_category_by_name(db, &category)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: category.clone(),
        })?;

    let model = budget::ActiveModel {
        category: Set(category.clone()),
        amount_cents: Set(amount_cents),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    Budget::insert(model)
        .on_conflict(
            OnConflict::column(budget::Column::Category)
                .update_columns([budget::Column::AmountCents, budget::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!("Budget for '{}' set to {}", category, amount);
    Budget::find()
        .filter(budget::Column::Category.eq(category.as_str()))
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound { name: category })
}

/// Retrieves every budget, ordered by category name.
pub async fn get_budgets(db: &DatabaseConnection) -> Result<Vec<budget::Model>> {
    Budget::find()
        .order_by_asc(budget::Column::Category)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Budget usage of a single category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryProgress {
    /// Category name
    pub category: String,
    /// Monthly budget
    pub budget: Decimal,
    /// Paid expenses in the month
    pub spent: Decimal,
    /// What is left, never below zero
    pub remaining: Decimal,
}

/// Budget usage of a whole month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetOverview {
    /// `YYYY-MM`
    pub month: String,
    /// One entry per budgeted category, by name
    pub categories: Vec<CategoryProgress>,
    /// Sum of all budgets
    pub total_budget: Decimal,
    /// Paid expenses in the month across all categories
    pub total_spent: Decimal,
    /// `total_budget - total_spent`, never below zero
    pub total_remaining: Decimal,
}

/// Computes budget usage for the month containing `month`.
///
/// # Arguments
/// * `budgets` - Stored budgets
/// * `transactions` - The current transaction set
/// * `month` - Any day of the month to report on
#[must_use]
pub fn budget_progress(
    budgets: &[budget::Model],
    transactions: &[transaction::Model],
    month: NaiveDate,
) -> BudgetOverview {
    let start = calendar::first_of_month(month);
    let end = calendar::last_of_month(month);

    let mut spent_by_category: BTreeMap<&str, i64> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| {
        tx.kind == TransactionKind::Expense
            && tx.status == TransactionStatus::Paid
            && (start..=end).contains(&effective_date(tx))
    }) {
        *spent_by_category.entry(tx.category.as_str()).or_insert(0) += tx.amount_cents;
    }

    let mut categories: Vec<CategoryProgress> = budgets
        .iter()
        .map(|b| {
            let spent = spent_by_category.get(b.category.as_str()).copied().unwrap_or(0);
            CategoryProgress {
                category: b.category.clone(),
                budget: money::from_cents(b.amount_cents),
                spent: money::from_cents(spent),
                remaining: money::from_cents((b.amount_cents - spent).max(0)),
            }
        })
        .collect();
    categories.sort_by(|a, b| a.category.cmp(&b.category));

    let total_budget: i64 = budgets.iter().map(|b| b.amount_cents).sum();
    let total_spent: i64 = spent_by_category.values().sum();

    BudgetOverview {
        month: calendar::month_key(start),
        categories,
        total_budget: money::from_cents(total_budget),
        total_spent: money::from_cents(total_spent),
        total_remaining: money::from_cents((total_budget - total_spent).max(0)),
    }
}
