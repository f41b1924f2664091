#![allow(clippy::result_large_err)]

use chrono::Utc;
use dotenvy::dotenv;
use household_ledger::{
    config::{database, seed, settings},
    core::{calendar, goal, invoice, recurrence, report},
    errors::Result,
    store::LedgerStore,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file
    dotenv().ok(); // Non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = settings::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Connect and create tables
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed categories, cards and budgets
    seed::seed_from_config(&db, &app_config)
        .await
        .inspect_err(|e| error!("Failed to seed from configuration: {}", e))?;

    // 6. Publish the first snapshot and log an overview of the current month
    let store = LedgerStore::new(db);
    let snapshot = store.refresh().await?;
    let today = Utc::now().date_naive();
    let month = calendar::month_key(today);

    let dashboard = report::generate_dashboard_report(store.db(), &snapshot, today).await?;
    info!(
        "{}: income {}, expenses {}, balance {}, pending {}",
        month,
        dashboard.summary.income,
        dashboard.summary.expenses,
        dashboard.summary.balance,
        dashboard.summary.pending
    );
    if !dashboard.overdue.is_empty() {
        warn!(
            "{} overdue bill(s) totalling {}",
            dashboard.overdue.len(),
            dashboard.overdue_total
        );
    }

    let filter = invoice::MonthFilter::Month(month);
    for card_invoices in invoice::card_invoices(&snapshot.transactions, &snapshot.cards, &filter) {
        for summary in &card_invoices.invoices {
            info!(
                "Invoice {} of '{}': {} ({} charge(s), {})",
                summary.invoice_month,
                card_invoices.card.name,
                summary.total,
                summary.transactions.len(),
                if summary.is_paid { "paid" } else { "open" }
            );
        }
    }
    for (card_id, invoice_month) in invoice::duplicate_invoice_payments(&snapshot.transactions) {
        warn!(
            "Invoice {} of card {} has more than one payment",
            invoice_month, card_id
        );
    }

    let subscriptions = recurrence::active_subscriptions(&snapshot.transactions, today);
    info!(
        "{} active subscription(s), monthly commitment {}",
        subscriptions.len(),
        dashboard.monthly_commitment
    );

    for active_goal in goal::get_active_goals(store.db()).await? {
        info!(
            "Goal '{}': {}% of {}",
            active_goal.name,
            goal::calculate_progress(&active_goal),
            active_goal.target()
        );
    }

    Ok(())
}
