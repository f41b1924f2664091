//! Payment methods - the user-managed list transactions pick their method from.
//!
//! Methods are identified by a slug of their name. The credit method is built in:
//! credit charges and invoices depend on it, so it can never be removed.

use crate::{
    entities::{PaymentMethod, payment_method, transaction::CREDIT_PAYMENT_METHOD},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{info, instrument, warn};

/// Methods created on first start, as (id, name).
pub const DEFAULT_PAYMENT_METHODS: [(&str, &str); 5] = [
    ("pix", "PIX"),
    ("cash", "Cash"),
    ("debit", "Debit"),
    (CREDIT_PAYMENT_METHOD, "Credit"),
    ("transfer", "Transfer"),
];

/// Identifier for a method name: trimmed, lowercased, whitespace runs as `_`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Retrieves all payment methods, by name.
pub async fn get_all_payment_methods(
    db: &DatabaseConnection,
) -> Result<Vec<payment_method::Model>> {
    PaymentMethod::find()
        .order_by_asc(payment_method::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fails with [`Error::Validation`] unless a method with this id exists.
pub async fn ensure_payment_method<C: ConnectionTrait>(db: &C, method_id: &str) -> Result<()> {
    if PaymentMethod::find_by_id(method_id.to_string())
        .one(db)
        .await?
        .is_none()
    {
        return Err(Error::Validation {
            message: format!("Unknown payment method '{method_id}'"),
        });
    }
    Ok(())
}

/// Adds a method. Names whose slug is already taken are rejected.
#[instrument(skip(db))]
pub async fn add_payment_method(
    db: &DatabaseConnection,
    name: String,
) -> Result<payment_method::Model> {
    let name = name.trim().to_string();
    let id = slugify(&name);
    if id.is_empty() {
        return Err(Error::Validation {
            message: "Payment method name cannot be empty".to_string(),
        });
    }
    if PaymentMethod::find_by_id(id.clone()).one(db).await?.is_some() {
        return Err(Error::DuplicatePaymentMethod { id });
    }

    let result = payment_method::ActiveModel {
        id: Set(id),
        name: Set(name),
    }
    .insert(db)
    .await?;
    info!("Added payment method '{}'", result.id);
    Ok(result)
}

/// Removes a method. Transactions already paid with it keep their value.
#[instrument(skip(db))]
pub async fn delete_payment_method(db: &DatabaseConnection, method_id: &str) -> Result<()> {
    if method_id == CREDIT_PAYMENT_METHOD {
        warn!("Refusing to delete the built-in credit method");
        return Err(Error::Validation {
            message: "The credit method cannot be removed".to_string(),
        });
    }
    let result = PaymentMethod::delete_by_id(method_id.to_string())
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::Validation {
            message: format!("Unknown payment method '{method_id}'"),
        });
    }
    info!("Deleted payment method '{}'", method_id);
    Ok(())
}

/// Inserts the default methods when the table is empty. Returns how many were created.
pub async fn seed_payment_methods(db: &DatabaseConnection) -> Result<usize> {
    if PaymentMethod::find().count(db).await? > 0 {
        return Ok(0);
    }
    for (id, name) in DEFAULT_PAYMENT_METHODS {
        payment_method::ActiveModel {
            id: Set(id.to_string()),
            name: Set(name.to_string()),
        }
        .insert(db)
        .await?;
    }
    Ok(DEFAULT_PAYMENT_METHODS.len())
}
