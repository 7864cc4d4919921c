use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::SqlitePersistence;
use crate::error::{AppError, Result};
use crate::models::{Direction, PaperTrade, TradeFilter, TradeStatus};
use crate::risk::normalize_symbol;
use crate::risk::{TradeChanges, ValidatedTrade};
use crate::stats::PaperTradingStats;

const TRADE_COLUMNS: &str = "id, symbol, alert_id, direction, entry_price, stop_loss, take_profit, \
     quantity, risk_amount, risk_percentage, position_value, potential_loss, potential_profit, \
     risk_reward_ratio, status, exit_price, exit_time, actual_profit_loss, notes, \
     created_at, updated_at";

fn trade_from_row(row: &SqliteRow) -> Result<PaperTrade> {
    let direction_str: String = row.try_get("direction")?;
    let status_str: String = row.try_get("status")?;

    let direction = match direction_str.as_str() {
        "LONG" => Direction::Long,
        "SHORT" => Direction::Short,
        other => {
            return Err(AppError::Persistence(format!(
                "Invalid trade direction '{}' in paper_trades",
                other
            )))
        }
    };

    let status = match status_str.as_str() {
        "planned" => TradeStatus::Planned,
        "active" => TradeStatus::Active,
        "closed" => TradeStatus::Closed,
        other => {
            return Err(AppError::Persistence(format!(
                "Invalid trade status '{}' in paper_trades",
                other
            )))
        }
    };

    let exit_time: Option<DateTime<Utc>> = row.try_get("exit_time")?;

    Ok(PaperTrade {
        id: row.try_get("id")?,
        symbol: row.try_get("symbol")?,
        alert_id: row.try_get("alert_id")?,
        direction,
        entry_price: row.try_get("entry_price")?,
        stop_loss: row.try_get("stop_loss")?,
        take_profit: row.try_get("take_profit")?,
        quantity: row.try_get("quantity")?,
        risk_amount: row.try_get("risk_amount")?,
        risk_percentage: row.try_get("risk_percentage")?,
        position_value: row.try_get("position_value")?,
        potential_loss: row.try_get("potential_loss")?,
        potential_profit: row.try_get("potential_profit")?,
        risk_reward_ratio: row.try_get("risk_reward_ratio")?,
        status,
        exit_price: row.try_get("exit_price")?,
        exit_time,
        actual_profit_loss: row.try_get("actual_profit_loss")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl SqlitePersistence {
    /// Load paper trades, newest first, optionally filtered by status and symbol
    pub async fn list_paper_trades(&self, filter: &TradeFilter) -> Result<Vec<PaperTrade>> {
        // Blank query values (`?status=&symbol=`) mean no filter
        let status = filter
            .status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse::<TradeStatus>())
            .transpose()?;
        let symbol = filter
            .symbol
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(normalize_symbol)
            .transpose()?;

        let sql = format!(
            r#"
            SELECT {}
            FROM paper_trades
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR symbol = ?2)
            ORDER BY created_at DESC, id DESC
            "#,
            TRADE_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(symbol)
            .fetch_all(&self.pool)
            .await?;

        let trades = rows.iter().map(trade_from_row).collect::<Result<Vec<_>>>()?;

        tracing::debug!("Loaded {} paper trades", trades.len());

        Ok(trades)
    }

    pub async fn get_paper_trade(&self, id: i64) -> Result<PaperTrade> {
        let sql = format!("SELECT {} FROM paper_trades WHERE id = ?", TRADE_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trade {} not found", id)))?;

        trade_from_row(&row)
    }

    /// Persist a validated trade
    pub async fn create_paper_trade(&self, trade: ValidatedTrade) -> Result<PaperTrade> {
        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO paper_trades (
                symbol, alert_id, direction, entry_price, stop_loss, take_profit,
                quantity, risk_amount, risk_percentage, position_value,
                potential_loss, potential_profit, risk_reward_ratio,
                status, notes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            TRADE_COLUMNS
        );

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&sql)
            .bind(&trade.symbol)
            .bind(trade.alert_id)
            .bind(trade.direction.as_str())
            .bind(trade.entry_price)
            .bind(trade.stop_loss)
            .bind(trade.take_profit)
            .bind(trade.quantity)
            .bind(trade.risk_amount)
            .bind(trade.risk_percentage)
            .bind(trade.position_value)
            .bind(trade.potential_loss)
            .bind(trade.potential_profit)
            .bind(trade.risk_reward_ratio)
            .bind(trade.status.as_str())
            .bind(&trade.notes)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let created = trade_from_row(&row)?;

        tx.commit().await?;

        tracing::info!(
            "Created paper trade {}: {} {} @ {}",
            created.id,
            created.symbol,
            created.direction,
            created.entry_price
        );

        Ok(created)
    }

    /// Apply a partial update; only supplied fields change
    pub async fn update_paper_trade(&self, id: i64, changes: TradeChanges) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM paper_trades WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_none() {
            return Err(AppError::NotFound(format!("Trade {} not found", id)));
        }

        if changes.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE paper_trades
            SET status = COALESCE(?, status),
                exit_price = COALESCE(?, exit_price),
                exit_time = COALESCE(?, exit_time),
                actual_profit_loss = COALESCE(?, actual_profit_loss),
                notes = COALESCE(?, notes),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.exit_price)
        .bind(changes.exit_time)
        .bind(changes.actual_profit_loss)
        .bind(&changes.notes)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Updated paper trade {}", id);

        Ok(())
    }

    pub async fn delete_paper_trade(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM paper_trades WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Trade {} not found", id)));
        }

        tracing::info!("Deleted paper trade {}", id);

        Ok(())
    }

    /// Recompute statistics over every stored trade
    pub async fn paper_trading_stats(&self) -> Result<PaperTradingStats> {
        let trades = self.list_paper_trades(&TradeFilter::default()).await?;
        Ok(PaperTradingStats::from_trades(&trades))
    }
}
