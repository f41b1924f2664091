//! Card entity - A credit card whose charges are grouped into monthly invoices.
//!
//! The closing day decides which invoice a purchase falls into; the due day is
//! informational. No ordering is required between the two since a card can close
//! late in one month and be due early in the next.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Card database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    /// Unique identifier for the card
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Nubank", "Visa Gold")
    pub name: String,
    /// Partner who holds the card
    pub holder: String,
    /// Day of month the billing cycle closes, 1-31
    pub closing_day: u32,
    /// Day of month the invoice is due, 1-31
    pub due_day: u32,
}

/// Cards have no enforced relations; transactions keep their `card_id` even if a card goes away
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
