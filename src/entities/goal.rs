//! Goal entity - A savings target the household contributes to over time.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a goal is still being saved for
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum GoalStatus {
    /// Saved amount is below the target
    #[sea_orm(string_value = "active")]
    Active,
    /// Target reached
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Goal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Emergency fund")
    pub name: String,
    /// Amount to reach, in cents
    pub target_cents: i64,
    /// Amount saved so far, in cents
    pub current_cents: i64,
    /// Optional date the household wants to reach the target by
    pub deadline: Option<Date>,
    /// Free-form grouping (e.g., "Travel")
    pub category: String,
    /// Active or completed
    pub status: GoalStatus,
    /// When the goal was created
    pub created_at: DateTimeUtc,
    /// When the goal last changed
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Target as a decimal amount
    #[must_use]
    pub fn target(&self) -> Decimal {
        crate::core::money::from_cents(self.target_cents)
    }

    /// Saved amount as a decimal amount
    #[must_use]
    pub fn current(&self) -> Decimal {
        crate::core::money::from_cents(self.current_cents)
    }
}
