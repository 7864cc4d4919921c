use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{Direction, NewPaperTrade, PaperTradeUpdate, TradeStatus};

/// A trade that passed validation and is ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTrade {
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
    pub notes: Option<String>,
}

/// Partial update with the status already parsed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeChanges {
    pub status: Option<TradeStatus>,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
    pub actual_profit_loss: Option<f64>,
    pub notes: Option<String>,
}

impl TradeChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.exit_price.is_none()
            && self.exit_time.is_none()
            && self.actual_profit_loss.is_none()
            && self.notes.is_none()
    }
}

/// Trim and uppercase a trading pair symbol
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let normalized = symbol.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(AppError::Validation("Symbol must not be empty".to_string()));
    }
    Ok(normalized)
}

/// Check a proposed trade before it is written.
///
/// The first failing rule is reported. Risk and sizing fields
/// (risk_amount, risk_reward_ratio, ...) are taken as supplied.
pub fn validate_new_trade(trade: NewPaperTrade) -> Result<ValidatedTrade> {
    let direction: Direction = trade.direction.parse()?;

    if trade.entry_price <= 0.0 {
        return Err(AppError::Validation(
            "Entry price must be greater than 0".to_string(),
        ));
    }

    if trade.quantity <= 0.0 {
        return Err(AppError::Validation(
            "Quantity must be greater than 0".to_string(),
        ));
    }

    check_price_levels(direction, trade.entry_price, trade.stop_loss, trade.take_profit)?;

    let status = match trade.status.as_deref() {
        Some(raw) => raw.parse()?,
        None => TradeStatus::Planned,
    };

    Ok(ValidatedTrade {
        symbol: normalize_symbol(&trade.symbol)?,
        alert_id: trade.alert_id,
        direction,
        entry_price: trade.entry_price,
        stop_loss: trade.stop_loss,
        take_profit: trade.take_profit,
        quantity: trade.quantity,
        risk_amount: trade.risk_amount,
        risk_percentage: trade.risk_percentage,
        position_value: trade.position_value,
        potential_loss: trade.potential_loss,
        potential_profit: trade.potential_profit,
        risk_reward_ratio: trade.risk_reward_ratio,
        status,
        notes: trade.notes,
    })
}

/// LONG: stop < entry < take. SHORT: take < entry < stop.
fn check_price_levels(
    direction: Direction,
    entry_price: f64,
    stop_loss: f64,
    take_profit: f64,
) -> Result<()> {
    match direction {
        Direction::Long => {
            if stop_loss >= entry_price {
                return Err(AppError::Validation(
                    "For LONG the stop-loss must be below the entry price".to_string(),
                ));
            }
            if take_profit <= entry_price {
                return Err(AppError::Validation(
                    "For LONG the take-profit must be above the entry price".to_string(),
                ));
            }
        }
        Direction::Short => {
            if stop_loss <= entry_price {
                return Err(AppError::Validation(
                    "For SHORT the stop-loss must be above the entry price".to_string(),
                ));
            }
            if take_profit >= entry_price {
                return Err(AppError::Validation(
                    "For SHORT the take-profit must be below the entry price".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Parse the status of a partial update; other fields pass through unchanged
/// Parse an exit timestamp. Values without an offset are assumed UTC.
fn parse_exit_time(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Ok(time.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation(format!("Invalid exit_time '{}'", raw)))
}

pub fn validate_trade_update(update: PaperTradeUpdate) -> Result<TradeChanges> {
    let status = update
        .status
        .as_deref()
        .map(str::parse::<TradeStatus>)
        .transpose()?;

    Ok(TradeChanges {
        status,
        exit_price: update.exit_price,
        exit_time: update.exit_time.as_deref().map(parse_exit_time).transpose()?,
        actual_profit_loss: update.actual_profit_loss,
        notes: update.notes,
    })
}
