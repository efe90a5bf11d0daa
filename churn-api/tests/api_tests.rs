//! Integration tests for churn-api endpoints
//!
//! Tests cover:
//! - POST /predict success path with the bundled artifact
//! - Validation failures (422) that never reach the model
//! - Malformed bodies (400 / 415)
//! - Model failures (500) that leave the service running
//! - GET /health

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use churn_api::{build_router, AppState};
use churn_common::{ChurnModel, FeatureVector, ModelError, ModelInfo, PipelineModel};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

// =============================================================================
// Test doubles
// =============================================================================

/// Returns a fixed output and counts invocations
struct CountingModel {
    output: i64,
    calls: AtomicUsize,
}

impl CountingModel {
    fn new(output: i64) -> Arc<Self> {
        Arc::new(Self {
            output,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChurnModel for CountingModel {
    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<i64>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![self.output; rows.len()])
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            name: "counting".to_string(),
            kind: "test".to_string(),
            feature_names: vec![],
        }
    }
}

/// Always fails the way a shape mismatch would
struct BrokenModel;

impl ChurnModel for BrokenModel {
    fn predict_batch(&self, _rows: &[FeatureVector]) -> Result<Vec<i64>, ModelError> {
        Err(ModelError::Internal(
            "X has 3 features, but model is expecting 4".to_string(),
        ))
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            name: "broken".to_string(),
            kind: "test".to_string(),
            feature_names: vec![],
        }
    }
}

/// Panics inside predict
struct PanickingModel;

impl ChurnModel for PanickingModel {
    fn predict_batch(&self, _rows: &[FeatureVector]) -> Result<Vec<i64>, ModelError> {
        panic!("model exploded");
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            name: "panicking".to_string(),
            kind: "test".to_string(),
            feature_names: vec![],
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn artifact_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("modelo_churn.json")
}

fn bundled_app() -> Router {
    let model = PipelineModel::load(artifact_path()).expect("bundled artifact should load");
    build_router(AppState::new(Arc::new(model)))
}

fn app_with(model: Arc<dyn ChurnModel>) -> Router {
    build_router(AppState::new(model))
}

fn example_body() -> Value {
    json!({
        "international_plan": 0,
        "total_day_charge": 45.07,
        "total_eve_charge": 18.55,
        "customer_service_calls": 3
    })
}

fn predict_request(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// Success path
// =============================================================================

#[tokio::test]
async fn test_example_customer_is_predicted_to_churn() {
    let (status, body) = send(bundled_app(), predict_request(&example_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"churn_prediction": "Sim"}));
}

#[tokio::test]
async fn test_low_usage_customer_is_predicted_to_stay() {
    let body = json!({
        "international_plan": 0,
        "total_day_charge": 10.0,
        "total_eve_charge": 10.0,
        "customer_service_calls": 0
    });
    let (status, body) = send(bundled_app(), predict_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["churn_prediction"], "Não");
}

#[tokio::test]
async fn test_identical_requests_give_identical_answers() {
    let app = bundled_app();
    let (_, first) = send(app.clone(), predict_request(&example_body())).await;
    let (_, second) = send(app, predict_request(&example_body())).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_every_valid_input_gets_a_binary_label() {
    let app = bundled_app();
    for plan in [0, 1] {
        for day in [0.0, 15.5, 30.0, 59.64] {
            for eve in [0.0, 17.0, 30.91] {
                for calls in [0, 2, 9] {
                    let body = json!({
                        "international_plan": plan,
                        "total_day_charge": day,
                        "total_eve_charge": eve,
                        "customer_service_calls": calls
                    });
                    let (status, body) = send(app.clone(), predict_request(&body)).await;
                    assert_eq!(status, StatusCode::OK);
                    let label = body["churn_prediction"].as_str().unwrap();
                    assert!(label == "Sim" || label == "Não", "got {}", label);
                }
            }
        }
    }
}

#[tokio::test]
async fn test_test_double_output_is_mapped() {
    let (_, body) = send(app_with(CountingModel::new(1)), predict_request(&example_body())).await;
    assert_eq!(body["churn_prediction"], "Sim");

    let (_, body) = send(app_with(CountingModel::new(0)), predict_request(&example_body())).await;
    assert_eq!(body["churn_prediction"], "Não");
}

// =============================================================================
// Validation failures
// =============================================================================

#[tokio::test]
async fn test_invalid_inputs_never_reach_the_model() {
    let mut missing = example_body();
    missing.as_object_mut().unwrap().remove("total_day_charge");

    let mut negative = example_body();
    negative["total_eve_charge"] = json!(-3.2);

    let mut non_binary = example_body();
    non_binary["international_plan"] = json!(2);

    let mut fractional_calls = example_body();
    fractional_calls["customer_service_calls"] = json!(2.5);

    for (body, field) in [
        (missing, "total_day_charge"),
        (negative, "total_eve_charge"),
        (non_binary, "international_plan"),
        (fractional_calls, "customer_service_calls"),
    ] {
        let model = CountingModel::new(1);
        let (status, response) = send(app_with(model.clone()), predict_request(&body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
        assert_eq!(response["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(response["error"]["details"][0]["field"], field);
        assert_eq!(model.calls(), 0, "model must not run for {}", field);
    }
}

#[tokio::test]
async fn test_validation_lists_every_bad_field() {
    let model = CountingModel::new(0);
    let (status, body) = send(app_with(model), predict_request(&json!({}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let details = body["error"]["details"].as_array().unwrap();
    assert_eq!(details.len(), 4);
    assert!(details.iter().all(|d| d["message"] == "field required"));
}

#[tokio::test]
async fn test_malformed_json_is_a_client_error() {
    let model = CountingModel::new(0);
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"international_plan\": 0,"))
        .unwrap();

    let (status, body) = send(app_with(model.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_missing_content_type_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(example_body().to_string()))
        .unwrap();

    let (status, body) = send(app_with(CountingModel::new(0)), request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
}

// =============================================================================
// Model failures
// =============================================================================

#[tokio::test]
async fn test_model_error_is_a_server_error_with_detail() {
    let (status, body) = send(app_with(Arc::new(BrokenModel)), predict_request(&example_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PREDICTION_FAILED");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Erro durante a predição"));
    assert!(message.contains("expecting 4"));
}

#[tokio::test]
async fn test_out_of_domain_output_is_not_silently_mapped() {
    let (status, body) = send(app_with(CountingModel::new(2)), predict_request(&example_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("unexpected model output: 2"));
}

#[tokio::test]
async fn test_panicking_model_does_not_take_down_the_service() {
    let app = app_with(Arc::new(PanickingModel));

    let (status, body) = send(app.clone(), predict_request(&example_body())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "PREDICTION_FAILED");

    // Same router keeps answering
    let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _) = send(app, health).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_describes_loaded_model() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(bundled_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "churn-api");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_number());
    assert_eq!(body["model"]["kind"], "logistic_regression");
    assert_eq!(
        body["model"]["feature_names"],
        json!([
            "international_plan",
            "total_day_charge",
            "total_eve_charge",
            "customer_service_calls"
        ])
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let request = Request::builder().uri("/predict/batch").body(Body::empty()).unwrap();
    let response = bundled_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
