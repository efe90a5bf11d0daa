//! Error types for churn-api
//!
//! Validation problems are client errors and never reach the model. Anything
//! that goes wrong inside the model is a server error carrying the model's
//! own message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use churn_common::api::ErrorResponse;
use churn_common::{ModelError, ValidationError};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body parsed but one or more features are missing or invalid (422)
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Body could not be read as JSON (400 / 415)
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// Model invocation failed (500)
    #[error("Erro durante a predição: {0}")]
    Prediction(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::Prediction(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("VALIDATION_FAILED", message).with_details(err.fields),
            ),
            ApiError::Rejected { status, .. } => {
                let code = if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
                    "UNSUPPORTED_MEDIA_TYPE"
                } else {
                    "BAD_REQUEST"
                };
                (status, ErrorResponse::new(code, message))
            }
            ApiError::Prediction(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("PREDICTION_FAILED", message),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
