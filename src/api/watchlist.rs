use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use super::{AppState, CreatedResponse, MessageResponse};
use crate::error::Result;
use crate::models::{NewWatchlistEntry, WatchlistEntry, WatchlistUpdate};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<WatchlistEntry>>> {
    let entries = state.db.list_watchlist().await?;
    Ok(Json(entries))
}

pub async fn add(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewWatchlistEntry>, JsonRejection>,
) -> Result<Json<CreatedResponse>> {
    let Json(entry) = payload?;
    let added = state.db.add_watchlist_entry(entry).await?;

    Ok(Json(CreatedResponse {
        id: added.id,
        message: format!("{} added to watchlist", added.symbol),
        symbol: added.symbol,
        direction: None,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<WatchlistUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(update) = payload?;
    let symbol = state.db.update_watchlist_entry(id, update).await?;

    Ok(MessageResponse::new(format!("{} updated", symbol)))
}

pub async fn remove(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    let symbol = state.db.remove_watchlist_entry(id).await?;

    Ok(MessageResponse::new(format!("{} removed from watchlist", symbol)))
}
