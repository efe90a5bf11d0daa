//! churn-ui library - form client for the prediction service
//!
//! Server-rendered pages: a form collecting the four features, the latest
//! result, and the session's prediction history with per-entry delete.

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod client;
pub mod form;
pub mod history;
pub mod session;

pub use client::{ClientError, PredictionClient};
pub use history::{HistoryEntry, PredictionHistory};
pub use session::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Client bound to the prediction service
    pub client: PredictionClient,
    /// Per-browser histories
    pub sessions: SessionStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(client: PredictionClient) -> Self {
        Self::with_sessions(client, SessionStore::new())
    }

    pub fn with_sessions(client: PredictionClient, sessions: SessionStore) -> Self {
        Self {
            client,
            sessions,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::page_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
