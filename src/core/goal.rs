//! Savings goals - targets the household saves toward with contributions.
//!
//! Contributions only move the saved amount; they do not create transactions.
//! A goal is completed as soon as the saved amount reaches its target.

use crate::{
    core::money,
    entities::{Goal, GoalStatus, goal},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Category given to goals created without one.
pub const DEFAULT_GOAL_CATEGORY: &str = "Other";

/// A goal waiting to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGoal {
    /// Display name
    pub name: String,
    /// Amount to reach, positive
    pub target: Decimal,
    /// Amount already saved, zero or more
    pub current: Decimal,
    /// Optional deadline
    pub deadline: Option<NaiveDate>,
    /// Grouping, [`DEFAULT_GOAL_CATEGORY`] when `None`
    pub category: Option<String>,
}

/// Fields an edit may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalUpdate {
    /// New name
    pub name: Option<String>,
    /// New target
    pub target: Option<Decimal>,
    /// New deadline, `Some(None)` clears it
    pub deadline: Option<Option<NaiveDate>>,
    /// New category
    pub category: Option<String>,
}

fn status_for(current_cents: i64, target_cents: i64) -> GoalStatus {
    if current_cents >= target_cents {
        GoalStatus::Completed
    } else {
        GoalStatus::Active
    }
}

fn validated_name(name: &str) -> Result<String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Goal name cannot be empty".to_string(),
        });
    }
    Ok(name)
}

/// Percentage of the target saved, rounded and capped at 100. A zero target gives 0.
#[must_use]
pub fn calculate_progress(goal: &goal::Model) -> u32 {
    if goal.target_cents <= 0 {
        return 0;
    }
    let current = goal.current_cents.max(0);
    let percent = (current * 200 + goal.target_cents) / (2 * goal.target_cents);
    u32::try_from(percent.min(100)).unwrap_or(0)
}

/// Creates a goal.
///
/// # Arguments
/// * `db` - Database connection
/// * `new_goal` - Name, target, amount already saved, deadline and category
///
/// # Returns
/// The stored goal, already completed when the saved amount covers the target.
#[instrument(skip(db))]
pub async fn create_goal(db: &DatabaseConnection, new_goal: NewGoal) -> Result<goal::Model> {
    let name = validated_name(&new_goal.name)?;
    let target_cents = money::positive_cents(new_goal.target)?;
    let current_cents = money::to_cents(new_goal.current)?;
    if current_cents < 0 {
        return Err(Error::InvalidAmount {
            amount: new_goal.current,
        });
    }
    let category = new_goal
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_GOAL_CATEGORY.to_string());

    let now = Utc::now();
    let result = goal::ActiveModel {
        name: Set(name),
        target_cents: Set(target_cents),
        current_cents: Set(current_cents),
        deadline: Set(new_goal.deadline),
        category: Set(category),
        status: Set(status_for(current_cents, target_cents)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created goal '{}' ({})", result.name, result.target());
    Ok(result)
}

/// Retrieves every goal, by name.
pub async fn get_all_goals(db: &DatabaseConnection) -> Result<Vec<goal::Model>> {
    Goal::find()
        .order_by_asc(goal::Column::Name)
        .order_by_asc(goal::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the goals still being saved for.
pub async fn get_active_goals(db: &DatabaseConnection) -> Result<Vec<goal::Model>> {
    Goal::find()
        .filter(goal::Column::Status.eq(GoalStatus::Active))
        .order_by_asc(goal::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_goal(db: &DatabaseConnection, goal_id: i64) -> Result<goal::Model> {
    Goal::find_by_id(goal_id)
        .one(db)
        .await?
        .ok_or(Error::GoalNotFound { id: goal_id })
}

/// Applies a partial edit. A new target re-evaluates completion.
#[instrument(skip(db))]
pub async fn update_goal(
    db: &DatabaseConnection,
    goal_id: i64,
    changes: GoalUpdate,
) -> Result<goal::Model> {
    let existing = find_goal(db, goal_id).await?;
    let current_cents = existing.current_cents;
    let mut active: goal::ActiveModel = existing.into();

    if let Some(name) = changes.name {
        active.name = Set(validated_name(&name)?);
    }
    if let Some(target) = changes.target {
        let target_cents = money::positive_cents(target)?;
        active.target_cents = Set(target_cents);
        active.status = Set(status_for(current_cents, target_cents));
    }
    if let Some(deadline) = changes.deadline {
        active.deadline = Set(deadline);
    }
    if let Some(category) = changes.category {
        active.category = Set(category.trim().to_string());
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    info!("Updated goal {}", updated.id);
    Ok(updated)
}

/// Deletes a goal.
#[instrument(skip(db))]
pub async fn delete_goal(db: &DatabaseConnection, goal_id: i64) -> Result<()> {
    let result = Goal::delete_by_id(goal_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::GoalNotFound { id: goal_id });
    }
    info!("Deleted goal {}", goal_id);
    Ok(())
}

/// Adds a positive contribution to a goal's saved amount.
///
/// The goal is marked completed once the saved amount reaches the target.
#[instrument(skip(db))]
pub async fn add_contribution(
    db: &DatabaseConnection,
    goal_id: i64,
    amount: Decimal,
) -> Result<goal::Model> {
    let cents = money::positive_cents(amount)?;
    let existing = find_goal(db, goal_id).await?;
    let current_cents = existing.current_cents + cents;
    let status = status_for(current_cents, existing.target_cents);

    let mut active: goal::ActiveModel = existing.into();
    active.current_cents = Set(current_cents);
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    if status == GoalStatus::Completed {
        info!("Goal '{}' completed", updated.name);
    } else {
        info!("Added {} to goal '{}'", amount, updated.name);
    }
    Ok(updated)
}
