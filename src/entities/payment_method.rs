//! Payment method entity - The user-managed list of ways a bill can be paid.
//!
//! Transactions store the method's `id`, a lowercase slug derived from its name.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment method database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    /// Slug of the name, e.g. `meal_voucher`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name, e.g. "Meal Voucher"
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
