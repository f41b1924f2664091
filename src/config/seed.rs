//! Seeds an empty database from [`AppConfig`].
//!
//! Categories and the default payment methods are created only when their table
//! is empty, cards only when no card
//! with the same name exists, and budgets only for categories without one. Running
//! the seed again is therefore harmless.

use crate::{
    config::settings::AppConfig,
    core::{budget, card, category, payment_method},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument, warn};

/// What a seed run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Categories created
    pub categories: usize,
    /// Cards created
    pub cards: usize,
    /// Budgets set
    pub budgets: usize,
    /// Payment methods created
    pub payment_methods: usize,
}

/// Seeds categories, cards and budgets from the configuration.
#[instrument(skip(db, config))]
pub async fn seed_from_config(db: &DatabaseConnection, config: &AppConfig) -> Result<SeedReport> {
    let mut report = SeedReport {
        categories: category::seed_categories(db, &config.categories).await?,
        payment_methods: payment_method::seed_payment_methods(db).await?,
        ..Default::default()
    };

    for cfg_card in &config.cards {
        if card::get_card_by_name(db, &cfg_card.name).await?.is_some() {
            debug!("Card '{}' already exists. Skipping.", cfg_card.name);
            continue;
        }
        card::create_card(
            db,
            cfg_card.name.clone(),
            cfg_card.holder.clone(),
            cfg_card.closing_day,
            cfg_card.due_day,
        )
        .await?;
        report.cards += 1;
    }

    let existing = budget::get_budgets(db).await?;
    for cfg_budget in &config.budgets {
        if existing.iter().any(|b| b.category == cfg_budget.category) {
            debug!("Budget for '{}' already set. Skipping.", cfg_budget.category);
            continue;
        }
        if category::get_category_by_name(db, &cfg_budget.category).await?.is_none() {
            warn!(
                "Budget configured for unknown category '{}'. Skipping.",
                cfg_budget.category
            );
            continue;
        }
        budget::set_budget(db, cfg_budget.category.clone(), cfg_budget.amount).await?;
        report.budgets += 1;
    }

    info!(
        "Seeding complete: {} categories, {} cards, {} budgets, {} payment methods created",
        report.categories, report.cards, report.budgets, report.payment_methods
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::parse_config;
    use crate::test_utils::setup_test_db;

    const CONFIG: &str = r#"
        partners = ["Ana", "Bruno"]
        categories = ["Food", "Housing"]

        [[cards]]
        name = "Visa"
        holder = "Ana"
        closing_day = 10
        due_day = 20

        [[budgets]]
        category = "Food"
        amount = "650.00"

        [[budgets]]
        category = "Travel"
        amount = "100"
    "#;

    #[tokio::test]
    async fn test_seed_from_config() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(CONFIG)?;

        let report = seed_from_config(&db, &config).await?;
        assert_eq!(
            report,
            SeedReport {
                categories: 2,
                cards: 1,
                budgets: 1,
                // The test database starts with the default methods.
                payment_methods: 0,
            }
        );

        let budgets = budget::get_budgets(&db).await?;
        assert_eq!(budgets[0].amount_cents, 65_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_twice_creates_nothing_new() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(CONFIG)?;

        seed_from_config(&db, &config).await?;
        let second = seed_from_config(&db, &config).await?;
        assert_eq!(second, SeedReport::default());
        assert_eq!(card::get_all_cards(&db).await?.len(), 1);
        Ok(())
    }
}
