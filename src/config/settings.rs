//! Application settings loaded from config.toml
//!
//! Partners, the recurrence horizon, and the categories, cards and budgets used
//! to seed an empty database. Every section is optional.

use crate::{
    core::{category::DEFAULT_CATEGORIES, draft::JOINT, recurrence::DEFAULT_HORIZON_MONTHS},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Config file used when `CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Names of the partners sharing the ledger
    pub partners: Vec<String>,
    /// How many monthly occurrences a recurring bill fans out into
    pub recurrence_horizon_months: u32,
    /// Categories created when none exist
    pub categories: Vec<String>,
    /// Cards created when none exist
    pub cards: Vec<CardConfig>,
    /// Budgets set for categories that have none
    pub budgets: Vec<BudgetConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            partners: Vec::new(),
            recurrence_horizon_months: DEFAULT_HORIZON_MONTHS,
            categories: DEFAULT_CATEGORIES.iter().map(ToString::to_string).collect(),
            cards: Vec::new(),
            budgets: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Whether `name` may appear as `paid_by`: a configured partner or [`JOINT`].
    #[must_use]
    pub fn is_known_payer(&self, name: &str) -> bool {
        name == JOINT || self.partners.iter().any(|p| p == name)
    }

    /// Fails with [`Error::UnknownPayer`] unless [`Self::is_known_payer`] holds.
    pub fn check_payer(&self, name: &str) -> Result<()> {
        if self.is_known_payer(name) {
            Ok(())
        } else {
            Err(Error::UnknownPayer {
                name: name.to_string(),
            })
        }
    }

    fn validate(&self) -> Result<()> {
        for card in &self.cards {
            for day in [card.closing_day, card.due_day] {
                if !(1..=31).contains(&day) {
                    return Err(Error::Config {
                        message: format!("Card '{}' has invalid day {day}", card.name),
                    });
                }
            }
        }
        for budget in &self.budgets {
            if budget.amount.is_sign_negative() {
                return Err(Error::Config {
                    message: format!("Budget for '{}' cannot be negative", budget.category),
                });
            }
        }
        Ok(())
    }
}

/// A card to seed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardConfig {
    /// Display name
    pub name: String,
    /// Partner holding the card
    pub holder: String,
    /// Day the billing cycle closes
    pub closing_day: u32,
    /// Day the invoice is due
    pub due_day: u32,
}

/// A monthly budget to seed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BudgetConfig {
    /// Category name
    pub category: String,
    /// Monthly amount, written as a string (`"650.00"`)
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML is invalid, or a card
/// or budget entry is out of range.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads the file named by `CONFIG_PATH` (default `config.toml`).
///
/// A missing file is not an error; the defaults are used instead.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = match std::env::var("CONFIG_PATH") {
        Ok(path) => path,
        Err(std::env::VarError::NotPresent) => DEFAULT_CONFIG_PATH.to_string(),
        Err(e) => return Err(e.into()),
    };
    if !Path::new(&path).exists() {
        warn!("Config file {} not found, using defaults", path);
        return Ok(AppConfig::default());
    }
    let config = load_config(&path)?;
    info!(
        "Loaded {} with {} partner(s), {} card(s), {} budget(s)",
        path,
        config.partners.len(),
        config.cards.len(),
        config.budgets.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            partners = ["Ana", "Bruno"]
            recurrence_horizon_months = 6
            categories = ["Food", "Housing"]

            [[cards]]
            name = "Visa"
            holder = "Ana"
            closing_day = 28
            due_day = 5

            [[budgets]]
            category = "Food"
            amount = "650.00"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.partners, vec!["Ana", "Bruno"]);
        assert_eq!(config.recurrence_horizon_months, 6);
        assert_eq!(config.categories, vec!["Food", "Housing"]);
        assert_eq!(config.cards[0].closing_day, 28);
        assert_eq!(config.budgets[0].amount, Decimal::from_str("650.00").unwrap());
        assert!(config.is_known_payer("Bruno"));
        assert!(config.is_known_payer(JOINT));
        assert!(!config.is_known_payer("Carla"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.recurrence_horizon_months, 12);
        assert_eq!(config.categories.len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_invalid_card_day_rejected() {
        let toml_str = r#"
            [[cards]]
            name = "Visa"
            holder = "Ana"
            closing_day = 32
            due_day = 5
        "#;
        assert!(matches!(parse_config(toml_str), Err(Error::Config { .. })));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(matches!(
            parse_config("partners = ["),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
