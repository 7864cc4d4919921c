// SQLite persistence for favorites, watchlist and paper trades
pub mod favorites;
pub mod paper_trades;
pub mod watchlist;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// SQLite-backed store. Each operation takes its own pooled connection
/// or transaction; uncommitted transactions roll back when dropped.
#[derive(Clone)]
pub struct SqlitePersistence {
    pool: SqlitePool,
}

impl SqlitePersistence {
    /// Open (creating if missing) the database and run migrations
    ///
    /// # Arguments
    /// * `database_url` - SQLite URL, e.g. `sqlite://crypto_analyzer.db`
    /// * `max_connections` - Pool size
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        // WAL lets readers proceed while a single writer commits
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let persistence = Self::with_pool(pool).await?;

        tracing::info!("Connected to SQLite at {}", database_url);

        Ok(persistence)
    }

    /// Fresh in-memory database. A single connection that never expires,
    /// since every SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, applying pending migrations first
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        // Idempotent: already-applied migrations are skipped
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}
