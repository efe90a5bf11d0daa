//! churn-gate library - offline performance gate
//!
//! Scores a model artifact against a labeled CSV and decides whether it is
//! good enough to deploy.

pub mod dataset;
pub mod gate;
pub mod metrics;

pub use dataset::{DatasetError, EvaluationDataset};
pub use gate::{evaluate, EvaluationReport, GateFailure, GateThresholds, ThresholdMiss};
pub use metrics::ConfusionMatrix;
