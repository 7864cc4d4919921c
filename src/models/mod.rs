use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

pub const DEFAULT_FAVORITE_COLOR: &str = "#FFD700";

/// Trade direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Long, Direction::Short];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl FromStr for Direction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LONG" => Ok(Direction::Long),
            "SHORT" => Ok(Direction::Short),
            _ => Err(AppError::Validation(
                "Direction must be LONG or SHORT".to_string(),
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paper trade lifecycle status. Transitions are not guarded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    #[default]
    Planned,
    Active,
    Closed,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Planned => "planned",
            TradeStatus::Active => "active",
            TradeStatus::Closed => "closed",
        }
    }
}

impl FromStr for TradeStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(TradeStatus::Planned),
            "active" => Ok(TradeStatus::Active),
            "closed" => Ok(TradeStatus::Closed),
            _ => Err(AppError::Validation(format!(
                "Invalid trade status '{}' (expected planned, active or closed)",
                s
            ))),
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Stored records
// ============================================================================

/// A favorited trading pair
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: i64,
    pub symbol: String,
    pub is_active: bool,
    // Price-drop cache, written by the external price monitor
    pub price_drop_percentage: Option<f64>,
    pub current_price: Option<f64>,
    pub historical_price: Option<f64>,
    pub notes: Option<String>,
    pub color: String,
    pub sort_order: i64,
    pub favorite_added_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A watchlist row. `is_favorite` is derived from the favorites table on read.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WatchlistEntry {
    pub id: i64,
    pub symbol: String,
    pub is_active: bool,
    pub is_favorite: bool,
    pub price_drop_percentage: Option<f64>,
    pub current_price: Option<f64>,
    pub historical_price: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A simulated trade. Sizing and risk fields are recorded as supplied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperTrade {
    pub id: i64,
    pub symbol: String,
    pub alert_id: Option<i64>,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub quantity: f64,
    pub risk_amount: f64,
    pub risk_percentage: f64,
    pub position_value: f64,
    pub potential_loss: f64,
    pub potential_profit: f64,
    pub risk_reward_ratio: f64,
    pub status: TradeStatus,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
    pub actual_profit_loss: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaperTrade {
    /// Realized P&L counted toward statistics: only closed trades with a recorded result
    pub fn realized_pnl(&self) -> Option<f64> {
        match self.status {
            TradeStatus::Closed => self.actual_profit_loss,
            _ => None,
        }
    }
}

// ============================================================================
// Request payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFavorite {
    pub symbol: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoriteUpdate {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteReorder {
    pub symbol_order: Vec<String>,
}

/// Trade creation payload. Direction and status stay raw strings so that
/// bad values are reported as validation errors rather than body rejections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaperTrade {
    pub symbol: String,
    #[serde(default)]
    pub alert_id: Option<i64>,
    pub direction: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub quantity: f64,
    pub risk_amount: f64,
    pub risk_percentage: f64,
    pub position_value: f64,
    pub potential_loss: f64,
    pub potential_profit: f64,
    pub risk_reward_ratio: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperTradeUpdate {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub exit_price: Option<f64>,
    /// RFC 3339, or a naive ISO timestamp taken as UTC
    #[serde(default)]
    pub exit_time: Option<String>,
    #[serde(default)]
    pub actual_profit_loss: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Optional filters for trade listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWatchlistEntry {
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistUpdate {
    pub symbol: String,
    pub is_active: bool,
}
