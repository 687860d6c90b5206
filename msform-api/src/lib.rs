//! msform-api library - multi-step form submission service
//!
//! Accepts wizard submissions (personal details, address, documents),
//! validates and stores them, and serves them back.

pub mod api;
pub mod db;
pub mod error;
pub mod intake;
pub mod service;
pub mod validation;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::SqliteSubmissionRepository;
use crate::service::FormService;

/// Largest accepted request body
///
/// Five 5 MiB files grow by a third when base64-encoded in JSON.
pub const MAX_BODY_BYTES: usize = 40 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: FormService,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: FormService) -> Self {
        Self {
            service,
            startup_time: Utc::now(),
        }
    }

    /// Wire repository → service over a database pool
    pub fn with_pool(pool: sqlx::SqlitePool) -> Self {
        let repository = Arc::new(SqliteSubmissionRepository::new(pool));
        Self::new(FormService::new(repository))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::form_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
