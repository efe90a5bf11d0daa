//! Model evaluation and pass/fail thresholds

use churn_common::{ChurnModel, ModelError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::dataset::EvaluationDataset;
use crate::metrics::ConfusionMatrix;

/// Measured performance of one model over one dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub model: String,
    pub rows: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.confusion;
        writeln!(f, "Model:     {}", self.model)?;
        writeln!(f, "Rows:      {}", self.rows)?;
        writeln!(f, "Accuracy:  {:.2}%", self.accuracy * 100.0)?;
        writeln!(f, "Precision: {:.2}%", self.precision * 100.0)?;
        writeln!(f, "Recall:    {:.2}%", self.recall * 100.0)?;
        writeln!(f, "F1:        {:.4}", self.f1)?;
        write!(
            f,
            "Confusion: TP={} FP={} TN={} FN={}",
            c.true_positives, c.false_positives, c.true_negatives, c.false_negatives
        )
    }
}

/// One metric that came in under its minimum
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdMiss {
    pub metric: &'static str,
    pub measured: f64,
    pub required: f64,
}

impl fmt::Display for ThresholdMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.4} below minimum {:.4}",
            self.metric, self.measured, self.required
        )
    }
}

#[derive(Debug, Error)]
pub enum GateFailure {
    /// The model could not score the dataset at all
    #[error("model failed on the evaluation data: {0}")]
    Model(#[from] ModelError),

    /// `row` is 1-based over the data rows
    #[error("model returned {value} for row {row}, expected 0 or 1")]
    NonBinaryOutput { row: usize, value: i64 },

    #[error("{}", join_misses(.0))]
    BelowThreshold(Vec<ThresholdMiss>),
}

fn join_misses(misses: &[ThresholdMiss]) -> String {
    misses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Minimum scores a model must reach to ship
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateThresholds {
    pub min_accuracy: f64,
    pub min_f1: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            min_accuracy: 0.80,
            min_f1: 0.75,
        }
    }
}

impl GateThresholds {
    /// Every metric under its minimum is reported, not only the first
    pub fn check(&self, report: &EvaluationReport) -> Result<(), GateFailure> {
        let mut misses = Vec::new();
        if report.accuracy < self.min_accuracy {
            misses.push(ThresholdMiss {
                metric: "accuracy",
                measured: report.accuracy,
                required: self.min_accuracy,
            });
        }
        if report.f1 < self.min_f1 {
            misses.push(ThresholdMiss {
                metric: "f1",
                measured: report.f1,
                required: self.min_f1,
            });
        }

        if misses.is_empty() {
            Ok(())
        } else {
            Err(GateFailure::BelowThreshold(misses))
        }
    }
}

/// Score `model` over every row of `dataset` in a single batch
///
/// Fails before computing any metric if an output is outside {0, 1}.
pub fn evaluate(
    model: &dyn ChurnModel,
    dataset: &EvaluationDataset,
) -> Result<EvaluationReport, GateFailure> {
    let info = model.describe();
    debug!("Evaluating {} over {} rows", info.name, dataset.len());

    let outputs = model.predict_batch(dataset.features())?;
    if outputs.len() != dataset.len() {
        return Err(ModelError::OutputShape {
            expected: dataset.len(),
            actual: outputs.len(),
        }
        .into());
    }

    let mut predicted = Vec::with_capacity(outputs.len());
    for (idx, &value) in outputs.iter().enumerate() {
        match value {
            0 | 1 => predicted.push(value as u8),
            _ => return Err(GateFailure::NonBinaryOutput { row: idx + 1, value }),
        }
    }

    let confusion = ConfusionMatrix::from_labels(dataset.labels(), &predicted);
    let report = EvaluationReport {
        model: info.name,
        rows: dataset.len(),
        accuracy: confusion.accuracy(),
        precision: confusion.precision(),
        recall: confusion.recall(),
        f1: confusion.f1(),
        confusion,
    };
    info!(
        "Evaluated {}: accuracy={:.4} f1={:.4}",
        report.model, report.accuracy, report.f1
    );
    Ok(report)
}
