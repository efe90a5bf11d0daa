//! Prediction endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use churn_common::api::PredictResponse;
use churn_common::FeatureVector;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{ApiError, ApiResult, AppState};

/// POST /predict
///
/// Validates the four features, runs the model on a blocking worker and maps
/// its 0/1 output to "Não"/"Sim". Invalid bodies are rejected before the
/// model is touched.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected prediction request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let features = FeatureVector::from_json(&body).map_err(|e| {
        warn!("Validation failed: {}", e);
        ApiError::from(e)
    })?;

    // A panicking model surfaces as a JoinError instead of unwinding the server
    let model = state.model.clone();
    let outcome = tokio::task::spawn_blocking(move || model.predict_label(&features))
        .await
        .map_err(|e| ApiError::Prediction(format!("model worker failed: {}", e)))
        .and_then(|result| result.map_err(ApiError::from));

    match outcome {
        Ok(label) => {
            info!(
                prediction = %label,
                international_plan = features.international_plan,
                customer_service_calls = features.customer_service_calls,
                "Prediction served"
            );
            Ok(Json(PredictResponse {
                churn_prediction: label,
            }))
        }
        Err(e) => {
            error!("Prediction failed: {}", e);
            Err(e)
        }
    }
}

/// Build prediction routes
pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}
