// Core modules
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod risk;
pub mod stats;

// Re-export commonly used types
pub use api::{create_router, AppState};
pub use db::SqlitePersistence;
pub use error::{AppError, Result};
pub use models::*;
pub use stats::PaperTradingStats;
