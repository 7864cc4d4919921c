// HTTP API: favorites, paper trades and watchlist
pub mod favorites;
pub mod paper_trades;
pub mod watchlist;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::db::SqlitePersistence;
use crate::models::Direction;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePersistence,
}

impl AppState {
    pub fn new(db: SqlitePersistence) -> Self {
        Self { db }
    }
}

/// Acknowledgement returned by create endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

/// Build the application router
///
/// # Arguments
/// * `state` - Shared handler state
/// * `static_dir` - Optional front-end bundle served for non-API paths
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/favorites", get(favorites::list).post(favorites::add))
        .route("/favorites/reorder", post(favorites::reorder))
        .route(
            "/favorites/:symbol",
            put(favorites::update).delete(favorites::remove),
        )
        .route(
            "/paper-trades",
            get(paper_trades::list).post(paper_trades::create),
        )
        .route("/paper-trades/stats", get(paper_trades::stats))
        .route(
            "/paper-trades/:id",
            get(paper_trades::get_one)
                .put(paper_trades::update)
                .delete(paper_trades::remove),
        )
        .route("/watchlist", get(watchlist::list).post(watchlist::add))
        .route(
            "/watchlist/:id",
            put(watchlist::update).delete(watchlist::remove),
        );

    let mut router = Router::new().route("/health", get(health)).nest("/api", api);

    if let Some(dir) = static_dir {
        tracing::info!("Serving static files from {}", dir.display());
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
