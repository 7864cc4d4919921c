use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Direction, PaperTrade, TradeStatus};

/// Number of symbols reported in the per-symbol breakdown
pub const TOP_SYMBOLS_LIMIT: usize = 10;

/// Totals across every paper trade
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralStats {
    pub total_trades: usize,
    pub planned_trades: usize,
    pub active_trades: usize,
    pub closed_trades: usize,
    pub winning_trades: usize, // Closed with P&L > 0
    pub losing_trades: usize,  // Closed with P&L < 0
    pub total_pnl: f64,
    pub avg_pnl: Option<f64>, // None until a closed trade has a recorded P&L
    pub total_risk_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolStats {
    pub symbol: String,
    pub trades_count: usize,
    pub symbol_pnl: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectionStats {
    pub direction: Direction,
    pub trades_count: usize,
    pub direction_pnl: f64,
    pub avg_pnl: Option<f64>,
}

/// Aggregate view served by the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperTradingStats {
    pub general: GeneralStats,
    pub by_symbol: Vec<SymbolStats>,
    pub by_direction: Vec<DirectionStats>,
}

impl PaperTradingStats {
    /// Calculate statistics from the full set of paper trades
    ///
    /// Only closed trades contribute P&L. Closed trades without a recorded
    /// `actual_profit_loss` add nothing to sums and are left out of averages.
    pub fn from_trades(trades: &[PaperTrade]) -> Self {
        Self {
            general: Self::general(trades),
            by_symbol: Self::by_symbol(trades),
            by_direction: Self::by_direction(trades),
        }
    }

    fn general(trades: &[PaperTrade]) -> GeneralStats {
        let count_status =
            |status: TradeStatus| trades.iter().filter(|t| t.status == status).count();

        let realized: Vec<f64> = trades.iter().filter_map(PaperTrade::realized_pnl).collect();

        GeneralStats {
            total_trades: trades.len(),
            planned_trades: count_status(TradeStatus::Planned),
            active_trades: count_status(TradeStatus::Active),
            closed_trades: count_status(TradeStatus::Closed),
            winning_trades: realized.iter().filter(|pnl| **pnl > 0.0).count(),
            losing_trades: realized.iter().filter(|pnl| **pnl < 0.0).count(),
            total_pnl: total(realized.iter().copied()),
            avg_pnl: mean(&realized),
            total_risk_amount: total(trades.iter().map(|t| t.risk_amount)),
        }
    }

    fn by_symbol(trades: &[PaperTrade]) -> Vec<SymbolStats> {
        let mut grouped: BTreeMap<&str, (usize, f64)> = BTreeMap::new();

        for trade in trades {
            let entry = grouped.entry(trade.symbol.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += trade.realized_pnl().unwrap_or(0.0);
        }

        let mut ranked: Vec<SymbolStats> = grouped
            .into_iter()
            .map(|(symbol, (trades_count, symbol_pnl))| SymbolStats {
                symbol: symbol.to_string(),
                trades_count,
                symbol_pnl,
            })
            .collect();

        // Stable sort keeps the alphabetical order among equal counts
        ranked.sort_by(|a, b| b.trades_count.cmp(&a.trades_count));
        ranked.truncate(TOP_SYMBOLS_LIMIT);
        ranked
    }

    fn by_direction(trades: &[PaperTrade]) -> Vec<DirectionStats> {
        Direction::ALL
            .iter()
            .map(|&direction| {
                let matching: Vec<&PaperTrade> =
                    trades.iter().filter(|t| t.direction == direction).collect();
                let realized: Vec<f64> = matching.iter().filter_map(|t| t.realized_pnl()).collect();

                DirectionStats {
                    direction,
                    trades_count: matching.len(),
                    direction_pnl: total(realized.iter().copied()),
                    avg_pnl: mean(&realized),
                }
            })
            .collect()
    }
}

// Folds from +0.0 so an empty set reports 0 rather than -0
fn total(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |acc, v| acc + v)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(total(values.iter().copied()) / values.len() as f64)
    }
}
