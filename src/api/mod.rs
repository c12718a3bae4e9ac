//! HTTP Adapter
//!
//! Thin transport layer over the engine: every handler is a pass-through
//! to one engine operation. No engine logic lives here.

pub mod baselines;
pub mod error;
pub mod scan;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::logic::baseline::BaselineStore;
use crate::logic::scan::HostScanner;

pub use error::{ApiError, ApiResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BaselineStore>,
    pub scanner: Arc<dyn HostScanner>,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(scan::health))
        .route("/api/system/info", get(scan::system_info))
        // Stateless scans
        .route("/api/processes", get(scan::processes))
        .route("/api/ports", get(scan::ports))
        .route("/api/startup", get(scan::startup))
        .route("/api/integrity", get(scan::integrity))
        .route("/api/metrics", get(scan::metrics))
        .route("/api/alerts", get(scan::alerts))
        .route("/api/scan/quick", post(scan::quick_scan))
        .route("/api/scan/full", post(scan::full_scan))
        // Baselines
        .route("/api/baseline/create", post(baselines::create))
        .route("/api/baseline/active", get(baselines::active))
        .route("/api/baseline/list", get(baselines::list))
        .route("/api/baseline/compare", post(baselines::compare))
        .route(
            "/api/baseline/:id",
            get(baselines::get).delete(baselines::delete),
        )
        .route("/api/baseline/:id/activate", post(baselines::activate))
        .route("/api/baseline/:id/history", get(baselines::history))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
