//! Live read-only view of the ledger.
//!
//! [`LedgerStore`] keeps the latest [`LedgerSnapshot`] in a `watch` channel.
//! Every call to [`LedgerStore::refresh`] reloads transactions and cards and
//! pushes the new snapshot to all subscribers; the pure modules in `core` then
//! compute from that snapshot without touching the database.

use crate::{
    core::{card::get_all_cards, transaction::get_all_transactions},
    entities::{card, transaction},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// Full copy of the transaction and card collections at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// All transactions, newest due date first
    pub transactions: Vec<transaction::Model>,
    /// All cards, by name
    pub cards: Vec<card::Model>,
}

impl LedgerSnapshot {
    /// Loads a snapshot from the database.
    pub async fn load(db: &DatabaseConnection) -> Result<Self> {
        Ok(Self {
            transactions: get_all_transactions(db).await?,
            cards: get_all_cards(db).await?,
        })
    }

    /// Looks up a card by id.
    #[must_use]
    pub fn card(&self, card_id: i64) -> Option<&card::Model> {
        self.cards.iter().find(|c| c.id == card_id)
    }
}

/// Publishes ledger snapshots to any number of subscribers.
#[derive(Debug)]
pub struct LedgerStore {
    db: DatabaseConnection,
    sender: watch::Sender<Arc<LedgerSnapshot>>,
}

impl LedgerStore {
    /// Creates a store publishing an empty snapshot until the first refresh.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let (sender, _) = watch::channel(Arc::new(LedgerSnapshot::default()));
        Self { db, sender }
    }

    /// Database connection the store reads from.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns a receiver that sees the current snapshot and every later one.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<LedgerSnapshot>> {
        self.sender.subscribe()
    }

    /// The snapshot currently published.
    #[must_use]
    pub fn current(&self) -> Arc<LedgerSnapshot> {
        Arc::clone(&self.sender.borrow())
    }

    /// Reloads the snapshot and publishes it.
    ///
    /// On failure the previous snapshot stays published and the error is returned.
    pub async fn refresh(&self) -> Result<Arc<LedgerSnapshot>> {
        let snapshot = match LedgerSnapshot::load(&self.db).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                error!("Failed to refresh ledger snapshot: {}", e);
                return Err(e);
            }
        };
        self.sender.send_replace(Arc::clone(&snapshot));
        info!(
            "Ledger snapshot refreshed: {} transaction(s), {} card(s)",
            snapshot.transactions.len(),
            snapshot.cards.len()
        );
        Ok(snapshot)
    }
}
