//! Shared API request/response types
//!
//! Used by churn-api to build responses and by churn-ui to decode them.

use serde::{Deserialize, Serialize};

use crate::features::FieldError;
use crate::label::ChurnLabel;

/// Body of a successful `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub churn_prediction: ChurnLabel,
}

// ========================================
// Error Response Types
// ========================================

/// Error envelope returned with every 4xx/5xx
///
/// ```json
/// { "error": { "code": "VALIDATION_FAILED", "message": "...",
///              "details": [{"field": "total_day_charge", "message": "..."}] } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine readable code (VALIDATION_FAILED, BAD_REQUEST, PREDICTION_FAILED, ...)
    pub code: String,
    pub message: String,
    /// Per-field detail, only present for validation failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.into(),
                details: Vec::new(),
            },
        }
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.error.details = details;
        self
    }
}
