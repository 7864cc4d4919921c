use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use super::{AppState, CreatedResponse, MessageResponse};
use crate::error::Result;
use crate::models::{Favorite, FavoriteReorder, FavoriteUpdate, NewFavorite};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Favorite>>> {
    let favorites = state.db.list_favorites().await?;
    Ok(Json(favorites))
}

pub async fn add(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewFavorite>, JsonRejection>,
) -> Result<Json<CreatedResponse>> {
    let Json(favorite) = payload?;
    let added = state.db.add_favorite(favorite).await?;

    Ok(Json(CreatedResponse {
        id: added.id,
        message: format!("{} added to favorites", added.symbol),
        symbol: added.symbol,
        direction: None,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    symbol: std::result::Result<Path<String>, PathRejection>,
    payload: std::result::Result<Json<FavoriteUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(symbol) = symbol?;
    let Json(update) = payload?;
    let symbol = state.db.update_favorite(&symbol, update).await?;

    Ok(MessageResponse::new(format!("{} updated", symbol)))
}

pub async fn remove(
    State(state): State<AppState>,
    symbol: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(symbol) = symbol?;
    let symbol = state.db.remove_favorite(&symbol).await?;

    Ok(MessageResponse::new(format!(
        "{} removed from favorites",
        symbol
    )))
}

pub async fn reorder(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FavoriteReorder>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(reorder) = payload?;
    state.db.reorder_favorites(&reorder.symbol_order).await?;

    Ok(MessageResponse::new("Favorites order updated"))
}
