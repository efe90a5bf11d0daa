//! Page handlers
//!
//! The form posts back to `/predict`; every response re-renders the whole
//! page from the session's history.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::render::{render_page, Banner};
use crate::form::PredictionForm;
use crate::history::HistoryEntry;
use crate::session::Session;
use crate::AppState;

fn page_response(session: &Session, html: String) -> Response {
    let mut response = Html(html).into_response();
    if let Some(cookie) = session.set_cookie() {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// GET /
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(&headers).await;
    let history = session.history.lock().await;
    let html = render_page(None, history.entries(), None);
    drop(history);
    page_response(&session, html)
}

/// POST /predict
///
/// Invalid input and service failures render a banner and leave the history
/// untouched. A successful prediction is prepended to the history.
pub async fn submit_prediction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PredictionForm>,
) -> Response {
    let session = state.sessions.resolve(&headers).await;

    let (banner, keep_form) = match form.parse() {
        Err(err) => {
            debug!("Form rejected: {}", err);
            (Banner::InvalidInput(err), true)
        }
        Ok(submission) => match state.client.predict(&submission.features).await {
            Ok(label) => {
                info!("Prediction for session {}: {}", session.id, label);
                session.history.lock().await.add(HistoryEntry::new(
                    submission.features,
                    submission.display_name.clone(),
                    label,
                ));
                let banner = Banner::Prediction {
                    label,
                    display_name: submission.display_name,
                };
                (banner, false)
            }
            Err(err) => {
                warn!("Prediction request failed: {}", err);
                (Banner::ServiceError(err.to_string()), true)
            }
        },
    };

    let history = session.history.lock().await;
    let html = render_page(
        Some(&banner),
        history.entries(),
        keep_form.then_some(&form),
    );
    drop(history);
    page_response(&session, html)
}

/// POST /history/:id/delete
///
/// Unknown or malformed ids are ignored; the browser always lands back on `/`.
pub async fn delete_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let session = state.sessions.resolve(&headers).await;

    match Uuid::parse_str(&id) {
        Ok(id) => {
            let removed = session.history.lock().await.remove(id);
            debug!("Delete history entry {} (removed: {})", id, removed);
        }
        Err(_) => debug!("Ignoring delete for malformed id {:?}", id),
    }

    let mut response = Redirect::to("/").into_response();
    if let Some(cookie) = session.set_cookie() {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// Build page routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(submit_prediction))
        .route("/history/:id/delete", post(delete_entry))
}
