//! Model abstraction
//!
//! The serving and evaluation code only sees [`ChurnModel`]. The bundled
//! implementation is [`PipelineModel`], loaded from a JSON artifact; tests
//! substitute their own doubles.

mod pipeline;

pub use pipeline::{Classifier, ModelArtifact, PipelineModel, StandardScaler, TreeNode};

use serde::Serialize;
use thiserror::Error;

use crate::features::FeatureVector;
use crate::label::ChurnLabel;

/// Failure raised while invoking a model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Model was trained on different feature columns than the ones supplied
    #[error("feature mismatch: model expects {expected:?}, got {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Model returned the wrong number of outputs
    #[error("model returned {actual} outputs for {expected} rows")]
    OutputShape { expected: usize, actual: usize },

    /// An intermediate value was NaN or infinite
    #[error("non-finite value in {0}")]
    NonFinite(String),

    /// Output outside the binary {0, 1} domain
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(i64),

    /// Anything else the model implementation reports
    #[error("{0}")]
    Internal(String),
}

/// Description of a loaded model, exposed on the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub kind: String,
    pub feature_names: Vec<String>,
}

/// Pre-trained binary churn classifier
///
/// Implementations must be deterministic and hold no per-call state, so a
/// single instance can be shared read-only across requests.
pub trait ChurnModel: Send + Sync {
    /// Predict one raw class per row, in row order
    fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<i64>, ModelError>;

    fn describe(&self) -> ModelInfo;

    /// Predict a single row
    fn predict_one(&self, features: &FeatureVector) -> Result<i64, ModelError> {
        let outputs = self.predict_batch(std::slice::from_ref(features))?;
        match outputs.as_slice() {
            [value] => Ok(*value),
            other => Err(ModelError::OutputShape {
                expected: 1,
                actual: other.len(),
            }),
        }
    }

    /// Predict a single row and map it to a label
    fn predict_label(&self, features: &FeatureVector) -> Result<ChurnLabel, ModelError> {
        ChurnLabel::from_output(self.predict_one(features)?)
    }
}
