//! churn-api library - Prediction Service
//!
//! Serves a pre-trained churn classifier over HTTP. The model is loaded once
//! at startup and shared read-only by every request.

use axum::Router;
use chrono::{DateTime, Utc};
use churn_common::ChurnModel;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded model, never mutated after startup
    pub model: Arc<dyn ChurnModel>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(model: Arc<dyn ChurnModel>) -> Self {
        Self {
            model,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::predict_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
