/// Database configuration and connection management
pub mod database;

/// Seeding categories, cards and budgets from the configuration
pub mod seed;

/// Application settings loaded from config.toml
pub mod settings;
