use chrono::Utc;

use super::SqlitePersistence;
use crate::error::{AppError, Result};
use crate::models::{Favorite, FavoriteUpdate, NewFavorite, DEFAULT_FAVORITE_COLOR};
use crate::risk::normalize_symbol;

const FAVORITE_COLUMNS: &str = "id, symbol, is_active, price_drop_percentage, current_price, \
     historical_price, notes, color, sort_order, favorite_added_at, created_at, updated_at";

impl SqlitePersistence {
    /// Load favorites in display order (sort_order, then most recently added)
    pub async fn list_favorites(&self) -> Result<Vec<Favorite>> {
        let sql = format!(
            "SELECT {} FROM favorites ORDER BY sort_order ASC, favorite_added_at DESC, id DESC",
            FAVORITE_COLUMNS
        );

        let favorites = sqlx::query_as::<_, Favorite>(&sql)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Loaded {} favorites", favorites.len());

        Ok(favorites)
    }

    /// Add a pair to favorites at the end of the current order
    pub async fn add_favorite(&self, favorite: NewFavorite) -> Result<Favorite> {
        let symbol = normalize_symbol(&favorite.symbol)?;
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM favorites WHERE symbol = ?")
            .bind(&symbol)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(AppError::Duplicate(format!(
                "{} is already in favorites",
                symbol
            )));
        }

        let max_order: Option<i64> = sqlx::query_scalar("SELECT MAX(sort_order) FROM favorites")
            .fetch_one(&mut *tx)
            .await?;
        let sort_order = max_order.map_or(1, |max| max + 1);

        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO favorites (
                symbol, notes, color, sort_order, favorite_added_at, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            FAVORITE_COLUMNS
        );

        let inserted = sqlx::query_as::<_, Favorite>(&sql)
            .bind(&symbol)
            .bind(&favorite.notes)
            .bind(favorite.color.as_deref().unwrap_or(DEFAULT_FAVORITE_COLOR))
            .bind(sort_order)
            .bind(now)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Added {} to favorites (sort_order {})", symbol, sort_order);

        Ok(inserted)
    }

    /// Update notes and/or color; absent fields keep their value.
    /// Returns the normalized symbol.
    pub async fn update_favorite(&self, symbol: &str, update: FavoriteUpdate) -> Result<String> {
        let symbol = normalize_symbol(symbol)?;
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM favorites WHERE symbol = ?")
            .bind(&symbol)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_none() {
            return Err(AppError::NotFound(format!(
                "{} is not in favorites",
                symbol
            )));
        }

        if update.notes.is_none() && update.color.is_none() {
            return Ok(symbol);
        }

        sqlx::query(
            r#"
            UPDATE favorites
            SET notes = COALESCE(?, notes),
                color = COALESCE(?, color),
                updated_at = ?
            WHERE symbol = ?
            "#,
        )
        .bind(&update.notes)
        .bind(&update.color)
        .bind(Utc::now())
        .bind(&symbol)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Updated favorite {}", symbol);

        Ok(symbol)
    }

    /// Delete a favorite, returning its normalized symbol
    pub async fn remove_favorite(&self, symbol: &str) -> Result<String> {
        let symbol = normalize_symbol(symbol)?;

        let result = sqlx::query("DELETE FROM favorites WHERE symbol = ?")
            .bind(&symbol)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "{} is not in favorites",
                symbol
            )));
        }

        tracing::info!("Removed {} from favorites", symbol);

        Ok(symbol)
    }

    /// Assign each listed symbol its 0-based position as sort_order
    ///
    /// Unlisted favorites keep their current value and unknown symbols are
    /// skipped. Returns the number of favorites that were updated.
    pub async fn reorder_favorites(&self, symbol_order: &[String]) -> Result<u64> {
        let symbols = symbol_order
            .iter()
            .map(|s| normalize_symbol(s))
            .collect::<Result<Vec<_>>>()?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;

        for (index, symbol) in symbols.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE favorites SET sort_order = ?, updated_at = ? WHERE symbol = ?",
            )
            .bind(index as i64)
            .bind(now)
            .bind(symbol)
            .execute(&mut *tx)
            .await?;

            updated += result.rows_affected();
        }

        tx.commit().await?;

        tracing::info!(
            "Reordered favorites: {} listed, {} updated",
            symbols.len(),
            updated
        );

        Ok(updated)
    }
}
