//! Card business logic - credit cards and their billing cycle days.
//!
//! Closing and due days are validated here, once, so the invoice-cycle math can
//! assume a day in 1..=31. Deleting a card is refused while any transaction still
//! points at it.

use crate::{
    entities::{Card, Transaction, card, transaction},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{info, instrument, warn};

/// Checks that `day` is a valid day of month.
pub fn validate_day(day: u32) -> Result<u32> {
    if (1..=31).contains(&day) {
        Ok(day)
    } else {
        Err(Error::InvalidDay { day })
    }
}

/// Creates a new card after validating its name and cycle days.
#[instrument(skip(db))]
pub async fn create_card(
    db: &DatabaseConnection,
    name: String,
    holder: String,
    closing_day: u32,
    due_day: u32,
) -> Result<card::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Card name cannot be empty".to_string(),
        });
    }
    validate_day(closing_day)?;
    validate_day(due_day)?;

    let result = card::ActiveModel {
        name: Set(name),
        holder: Set(holder.trim().to_string()),
        closing_day: Set(closing_day),
        due_day: Set(due_day),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created card '{}' (closes on {}, due on {})",
        result.name, result.closing_day, result.due_day
    );
    Ok(result)
}

/// Retrieves all cards, ordered alphabetically by name.
pub async fn get_all_cards<C: ConnectionTrait>(db: &C) -> Result<Vec<card::Model>> {
    Card::find()
        .order_by_asc(card::Column::Name)
        .order_by_asc(card::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a card by id.
pub async fn get_card_by_id<C: ConnectionTrait>(
    db: &C,
    card_id: i64,
) -> Result<Option<card::Model>> {
    Card::find_by_id(card_id).one(db).await.map_err(Into::into)
}

/// Finds a card by its display name.
pub async fn get_card_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<card::Model>> {
    Card::find()
        .filter(card::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes a card. Blocked with [`Error::InUse`] while transactions reference it.
#[instrument(skip(db))]
pub async fn delete_card(db: &DatabaseConnection, card_id: i64) -> Result<()> {
    let card = get_card_by_id(db, card_id)
        .await?
        .ok_or(Error::CardNotFound { id: card_id })?;

    let count = Transaction::find()
        .filter(transaction::Column::CardId.eq(card_id))
        .count(db)
        .await?;
    if count > 0 {
        warn!(
            "Refusing to delete card '{}': used by {} transaction(s)",
            card.name, count
        );
        return Err(Error::InUse {
            entity: "card",
            name: card.name,
            count,
        });
    }

    let name = card.name.clone();
    card.delete(db).await?;
    info!("Deleted card '{}'", name);
    Ok(())
}
