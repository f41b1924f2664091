//! Budget entity - Monthly spending target for one category.
//!
//! A single amount per category applies to every month, matching how the
//! household plans: one planning sheet, compared against each month's spending.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category name this budget applies to, unique
    #[sea_orm(unique)]
    pub category: String,
    /// Monthly amount in cents
    pub amount_cents: i64,
    /// When this budget was last changed
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
