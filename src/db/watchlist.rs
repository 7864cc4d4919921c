use chrono::Utc;
use sqlx::SqliteConnection;

use super::SqlitePersistence;
use crate::error::{AppError, Result};
use crate::models::{NewWatchlistEntry, WatchlistEntry, WatchlistUpdate};
use crate::risk::normalize_symbol;

// is_favorite is derived from current favorites membership on every read
const WATCHLIST_SELECT: &str = r#"
    SELECT w.id, w.symbol, w.is_active,
           EXISTS (SELECT 1 FROM favorites f WHERE f.symbol = w.symbol) AS is_favorite,
           w.price_drop_percentage, w.current_price, w.historical_price,
           w.created_at, w.updated_at
    FROM watchlist w
"#;

async fn fetch_entry(conn: &mut SqliteConnection, id: i64) -> Result<WatchlistEntry> {
    let sql = format!("{} WHERE w.id = ?", WATCHLIST_SELECT);

    sqlx::query_as::<_, WatchlistEntry>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Watchlist entry {} not found", id)))
}

impl SqlitePersistence {
    /// Load the watchlist, favorites first then alphabetical
    pub async fn list_watchlist(&self) -> Result<Vec<WatchlistEntry>> {
        let sql = format!("{} ORDER BY is_favorite DESC, w.symbol ASC", WATCHLIST_SELECT);

        let entries = sqlx::query_as::<_, WatchlistEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Loaded {} watchlist entries", entries.len());

        Ok(entries)
    }

    pub async fn add_watchlist_entry(&self, entry: NewWatchlistEntry) -> Result<WatchlistEntry> {
        let symbol = normalize_symbol(&entry.symbol)?;
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM watchlist WHERE symbol = ?")
            .bind(&symbol)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(AppError::Duplicate(format!(
                "{} is already in the watchlist",
                symbol
            )));
        }

        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO watchlist (symbol, created_at, updated_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&symbol)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let inserted = fetch_entry(&mut tx, id).await?;

        tx.commit().await?;

        tracing::info!("Added {} to watchlist (id {})", symbol, id);

        Ok(inserted)
    }

    /// Replace symbol and active flag of an entry, returning the stored symbol
    pub async fn update_watchlist_entry(&self, id: i64, update: WatchlistUpdate) -> Result<String> {
        let symbol = normalize_symbol(&update.symbol)?;
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM watchlist WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_none() {
            return Err(AppError::NotFound(format!(
                "Watchlist entry {} not found",
                id
            )));
        }

        let conflict = sqlx::query("SELECT id FROM watchlist WHERE symbol = ? AND id != ?")
            .bind(&symbol)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if conflict.is_some() {
            return Err(AppError::Duplicate(format!(
                "{} is already in the watchlist",
                symbol
            )));
        }

        sqlx::query("UPDATE watchlist SET symbol = ?, is_active = ?, updated_at = ? WHERE id = ?")
            .bind(&symbol)
            .bind(update.is_active)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Updated watchlist entry {}: {}", id, symbol);

        Ok(symbol)
    }

    /// Delete an entry, returning the symbol it held
    pub async fn remove_watchlist_entry(&self, id: i64) -> Result<String> {
        let mut tx = self.pool.begin().await?;

        let symbol: Option<String> = sqlx::query_scalar("SELECT symbol FROM watchlist WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(symbol) = symbol else {
            return Err(AppError::NotFound(format!(
                "Watchlist entry {} not found",
                id
            )));
        };

        sqlx::query("DELETE FROM watchlist WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Removed {} from watchlist", symbol);

        Ok(symbol)
    }
}
