//! ppm-api library interface
//!
//! Exposes the router, state, and analysis core for integration testing.

pub mod api;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::engine::EngineInvoker;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Analysis engine invoker
    pub invoker: Arc<EngineInvoker>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, invoker: EngineInvoker) -> Self {
        Self {
            db,
            invoker: Arc::new(invoker),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ppm_routes())
        .merge(api::health_routes())
        .with_state(state)
}
