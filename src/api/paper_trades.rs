use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use super::{AppState, CreatedResponse, MessageResponse};
use crate::error::Result;
use crate::models::{NewPaperTrade, PaperTrade, PaperTradeUpdate, TradeFilter};
use crate::risk::{validate_new_trade, validate_trade_update};
use crate::stats::PaperTradingStats;

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TradeFilter>,
) -> Result<Json<Vec<PaperTrade>>> {
    let trades = state.db.list_paper_trades(&filter).await?;
    Ok(Json(trades))
}

pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewPaperTrade>, JsonRejection>,
) -> Result<Json<CreatedResponse>> {
    let Json(trade) = payload?;

    // Rejected trades never reach the database
    let validated = validate_new_trade(trade)?;
    let created = state.db.create_paper_trade(validated).await?;

    Ok(Json(CreatedResponse {
        id: created.id,
        message: format!(
            "{} paper trade for {} created",
            created.direction, created.symbol
        ),
        symbol: created.symbol,
        direction: Some(created.direction),
    }))
}

pub async fn get_one(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<PaperTrade>> {
    let Path(id) = id?;
    let trade = state.db.get_paper_trade(id).await?;
    Ok(Json(trade))
}

pub async fn update(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<PaperTradeUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(update) = payload?;
    let changes = validate_trade_update(update)?;
    state.db.update_paper_trade(id, changes).await?;

    Ok(MessageResponse::new(format!("Trade {} updated", id)))
}

pub async fn remove(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    state.db.delete_paper_trade(id).await?;

    Ok(MessageResponse::new(format!("Trade {} deleted", id)))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<PaperTradingStats>> {
    let stats = state.db.paper_trading_stats().await?;
    Ok(Json(stats))
}
