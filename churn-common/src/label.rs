//! Churn label returned to callers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ModelError;

/// Human-readable prediction, serialized as `"Sim"` or `"Não"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChurnLabel {
    /// Model output 1: the customer is predicted to churn
    #[serde(rename = "Sim")]
    Churn,
    /// Model output 0: the customer is predicted to stay
    #[serde(rename = "Não")]
    NoChurn,
}

impl ChurnLabel {
    /// Map a raw model output to a label
    ///
    /// Only 0 and 1 are valid. Anything else is reported instead of being
    /// folded into `NoChurn`.
    pub fn from_output(value: i64) -> Result<Self, ModelError> {
        match value {
            1 => Ok(ChurnLabel::Churn),
            0 => Ok(ChurnLabel::NoChurn),
            other => Err(ModelError::UnexpectedOutput(other)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChurnLabel::Churn => "Sim",
            ChurnLabel::NoChurn => "Não",
        }
    }
}

impl fmt::Display for ChurnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
