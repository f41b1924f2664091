//! Category business logic - the user-managed set of transaction categories.
//!
//! Transactions reference categories by name. A category that is still used by
//! any transaction cannot be deleted.

use crate::{
    entities::{Budget, Category, Transaction, budget, category, transaction},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Categories created on first start when none exist.
pub const DEFAULT_CATEGORIES: [&str; 11] = [
    "Housing",
    "Food",
    "Transport",
    "Leisure",
    "Health",
    "Electricity",
    "Water",
    "Internet",
    "Salary",
    "Credit Card Expenses",
    "Other",
];

/// Category assigned to imported rows that carry none.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Retrieves all categories, ordered alphabetically by name.
pub async fn get_all_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by its exact name.
pub async fn get_category_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category. Names are trimmed; empty and duplicate names are rejected.
#[instrument(skip(db))]
pub async fn create_category(db: &DatabaseConnection, name: String) -> Result<category::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Category name cannot be empty".to_string(),
        });
    }
    if get_category_by_name(db, &name).await?.is_some() {
        return Err(Error::Validation {
            message: format!("Category '{name}' already exists"),
        });
    }

    let result = category::ActiveModel {
        name: Set(name),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created category '{}'", result.name);
    Ok(result)
}

/// Deletes a category and its budget.
///
/// Blocked with [`Error::InUse`] while any transaction is filed under it.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, name: &str) -> Result<()> {
    let txn = db.begin().await?;

    let category = get_category_by_name(&txn, name)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: name.to_string(),
        })?;

    let count = Transaction::find()
        .filter(transaction::Column::Category.eq(name))
        .count(&txn)
        .await?;
    if count > 0 {
        warn!(
            "Refusing to delete category '{}': used by {} transaction(s)",
            name, count
        );
        return Err(Error::InUse {
            entity: "category",
            name: name.to_string(),
            count,
        });
    }

    Budget::delete_many()
        .filter(budget::Column::Category.eq(name))
        .exec(&txn)
        .await?;
    category.delete(&txn).await?;
    txn.commit().await?;

    info!("Deleted category '{}'", name);
    Ok(())
}

/// Inserts `names` when the category table is empty. Returns how many were created.
pub async fn seed_categories(db: &DatabaseConnection, names: &[String]) -> Result<usize> {
    if Category::find().count(db).await? > 0 {
        return Ok(0);
    }
    let mut created = 0;
    for name in names {
        if name.trim().is_empty() {
            continue;
        }
        // Duplicates in the list are skipped rather than failing the seed.
        if get_category_by_name(db, name.trim()).await?.is_none() {
            create_category(db, name.clone()).await?;
            created += 1;
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_category_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = create_category(&db, "   ".to_string()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_list_categories() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, " Pets ".to_string()).await?;
        create_category(&db, "Books".to_string()).await?;

        let names: Vec<String> = get_all_categories(&db)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Books", "Pets"]);

        let duplicate = create_category(&db, "Pets".to_string()).await;
        assert!(matches!(duplicate, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_blocked_while_in_use() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, "Food".to_string()).await?;
        create_test_transaction(&db, "Groceries", "80").await?;

        let result = delete_category(&db, "Food").await;
        assert!(matches!(
            result,
            Err(Error::InUse {
                entity: "category",
                count: 1,
                ..
            })
        ));
        assert!(get_category_by_name(&db, "Food").await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_removes_budget() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, "Pets".to_string()).await?;
        crate::core::budget::set_budget(&db, "Pets".to_string(), rust_decimal::Decimal::from(50))
            .await?;

        delete_category(&db, "Pets").await?;
        assert!(get_category_by_name(&db, "Pets").await?.is_none());
        assert!(crate::core::budget::get_budgets(&db).await?.is_empty());

        let missing = delete_category(&db, "Pets").await;
        assert!(matches!(missing, Err(Error::CategoryNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_categories_only_when_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let defaults: Vec<String> = DEFAULT_CATEGORIES.iter().map(ToString::to_string).collect();

        assert_eq!(seed_categories(&db, &defaults).await?, DEFAULT_CATEGORIES.len());
        assert_eq!(seed_categories(&db, &defaults).await?, 0);
        assert_eq!(get_all_categories(&db).await?.len(), DEFAULT_CATEGORIES.len());
        Ok(())
    }

    #[test]
    fn test_defaults_include_invoice_payment_category() {
        assert!(DEFAULT_CATEGORIES.contains(&crate::core::invoice::INVOICE_PAYMENT_CATEGORY));
        assert!(DEFAULT_CATEGORIES.contains(&FALLBACK_CATEGORY));
    }
}
