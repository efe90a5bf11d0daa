//! JSON pipeline artifact: optional standard scaler followed by a classifier
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "name": "churn-logistic-pipeline",
//!   "format_version": 1,
//!   "feature_names": ["international_plan", "total_day_charge",
//!                     "total_eve_charge", "customer_service_calls"],
//!   "scaler": { "mean": [0.1, 30.5, 17.0, 1.5], "scale": [0.3, 9.2, 4.3, 1.3] },
//!   "classifier": { "type": "logistic_regression",
//!                   "coefficients": [1.4, 1.6, 0.7, 1.2], "intercept": -1.0,
//!                   "threshold": 0.5 }
//! }
//! ```
//!
//! A `decision_tree` classifier is also understood. Its nodes are stored
//! flat; children always have a higher index than their parent.
//!
//! Structural problems are rejected at load time. A mismatch between the
//! artifact's feature names and [`FEATURE_NAMES`] is only reported when the
//! model is invoked, as a [`ModelError::SchemaMismatch`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::{ChurnModel, ModelError, ModelInfo};
use crate::features::{FeatureVector, FEATURE_NAMES};
use crate::{Error, Result};

/// Only artifact format this loader understands
pub const FORMAT_VERSION: u32 = 1;

fn default_threshold() -> f64 {
    0.5
}

/// Serialized form of a trained pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    pub format_version: u32,
    /// Columns the model was trained on, in order
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub classifier: Classifier,
}

/// Per-feature `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Classifier {
    /// Class 1 when `sigmoid(intercept + coefficients · x) > threshold`
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    DecisionTree { nodes: Vec<TreeNode> },
}

/// Decision tree node; a split goes left when `x[feature] <= threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: i64,
    },
}

impl Classifier {
    fn kind(&self) -> &'static str {
        match self {
            Classifier::LogisticRegression { .. } => "logistic_regression",
            Classifier::DecisionTree { .. } => "decision_tree",
        }
    }
}

impl ModelArtifact {
    /// Check internal consistency (lengths, indices, finite parameters)
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidArtifact(msg));

        if self.format_version != FORMAT_VERSION {
            return invalid(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, FORMAT_VERSION
            ));
        }

        let n = self.feature_names.len();
        if n == 0 {
            return invalid("feature_names is empty".to_string());
        }
        for (i, name) in self.feature_names.iter().enumerate() {
            if self.feature_names[..i].contains(name) {
                return invalid(format!("duplicate feature name '{}'", name));
            }
        }

        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return invalid(format!(
                    "scaler has {} means and {} scales for {} features",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    n
                ));
            }
            if scaler.mean.iter().any(|m| !m.is_finite()) {
                return invalid("scaler mean must be finite".to_string());
            }
            if scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                return invalid("scaler scale must be finite and non-zero".to_string());
            }
        }

        match &self.classifier {
            Classifier::LogisticRegression {
                coefficients,
                intercept,
                threshold,
            } => {
                if coefficients.len() != n {
                    return invalid(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        n
                    ));
                }
                if coefficients.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
                    return invalid("logistic parameters must be finite".to_string());
                }
                if !(*threshold > 0.0 && *threshold < 1.0) {
                    return invalid(format!("threshold {} outside (0, 1)", threshold));
                }
            }
            Classifier::DecisionTree { nodes } => {
                if nodes.is_empty() {
                    return invalid("decision tree has no nodes".to_string());
                }
                for (idx, node) in nodes.iter().enumerate() {
                    if let TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } = node
                    {
                        if *feature >= n {
                            return invalid(format!(
                                "node {} splits on feature {} (only {} features)",
                                idx, feature, n
                            ));
                        }
                        if !threshold.is_finite() {
                            return invalid(format!("node {} threshold must be finite", idx));
                        }
                        for child in [*left, *right] {
                            if child <= idx || child >= nodes.len() {
                                return invalid(format!(
                                    "node {} has invalid child index {}",
                                    idx, child
                                ));
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Model backed by a [`ModelArtifact`]
#[derive(Debug, Clone)]
pub struct PipelineModel {
    artifact: ModelArtifact,
}

impl PipelineModel {
    /// Load and validate an artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ArtifactNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&content).map_err(|e| {
            Error::InvalidArtifact(format!("{}: {}", path.display(), e))
        })?;

        let model = Self::from_artifact(artifact)?;
        debug!("Loaded model artifact from {}", path.display());
        Ok(model)
    }

    /// Wrap an in-memory artifact after validating it
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    fn check_schema(&self) -> std::result::Result<(), ModelError> {
        let matches = self.artifact.feature_names.len() == FEATURE_NAMES.len()
            && self
                .artifact
                .feature_names
                .iter()
                .zip(FEATURE_NAMES.iter())
                .all(|(a, b)| a == b);
        if matches {
            Ok(())
        } else {
            Err(ModelError::SchemaMismatch {
                expected: self.artifact.feature_names.clone(),
                actual: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            })
        }
    }

    fn transform(&self, row: [f64; 4]) -> std::result::Result<[f64; 4], ModelError> {
        let mut x = row;
        if let Some(scaler) = &self.artifact.scaler {
            for (i, value) in x.iter_mut().enumerate() {
                *value = (*value - scaler.mean[i]) / scaler.scale[i];
            }
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("scaled input".to_string()));
        }
        Ok(x)
    }

    fn classify(&self, x: &[f64; 4]) -> std::result::Result<i64, ModelError> {
        match &self.artifact.classifier {
            Classifier::LogisticRegression {
                coefficients,
                intercept,
                threshold,
            } => {
                let z = intercept
                    + coefficients
                        .iter()
                        .zip(x.iter())
                        .map(|(c, v)| c * v)
                        .sum::<f64>();
                let probability = 1.0 / (1.0 + (-z).exp());
                if !probability.is_finite() {
                    return Err(ModelError::NonFinite("decision function".to_string()));
                }
                Ok(i64::from(probability > *threshold))
            }
            Classifier::DecisionTree { nodes } => {
                let mut idx = 0;
                loop {
                    match nodes.get(idx) {
                        Some(TreeNode::Leaf { class }) => return Ok(*class),
                        Some(TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        }) => {
                            idx = if x[*feature] <= *threshold { *left } else { *right };
                        }
                        None => {
                            return Err(ModelError::Internal(format!(
                                "decision tree walked to missing node {}",
                                idx
                            )))
                        }
                    }
                }
            }
        }
    }
}

impl ChurnModel for PipelineModel {
    fn predict_batch(&self, rows: &[FeatureVector]) -> std::result::Result<Vec<i64>, ModelError> {
        self.check_schema()?;
        rows.iter()
            .map(|row| self.transform(row.to_row()).and_then(|x| self.classify(&x)))
            .collect()
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            name: self.artifact.name.clone(),
            kind: self.artifact.classifier.kind().to_string(),
            feature_names: self.artifact.feature_names.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn logistic() -> ModelArtifact {
        ModelArtifact {
            name: "test-logistic".to_string(),
            format_version: FORMAT_VERSION,
            feature_names: names(),
            scaler: Some(StandardScaler {
                mean: vec![0.0, 30.0, 17.0, 1.5],
                scale: vec![1.0, 10.0, 4.0, 1.5],
            }),
            classifier: Classifier::LogisticRegression {
                coefficients: vec![1.5, 1.5, 0.5, 1.0],
                intercept: -1.0,
                threshold: 0.5,
            },
        }
    }

    /// Splits on customer_service_calls: <= 3 → 0, else → `high`
    fn tree(high: i64) -> ModelArtifact {
        ModelArtifact {
            name: "test-tree".to_string(),
            format_version: FORMAT_VERSION,
            feature_names: names(),
            scaler: None,
            classifier: Classifier::DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 3,
                        threshold: 3.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf { class: 0 },
                    TreeNode::Leaf { class: high },
                ],
            },
        }
    }

    fn fv(plan: i64, day: f64, eve: f64, calls: i64) -> FeatureVector {
        FeatureVector::new(plan, day, eve, calls).unwrap()
    }

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_logistic_separates_low_and_high_risk() {
        let model = PipelineModel::from_artifact(logistic()).unwrap();
        let rows = [fv(0, 10.0, 10.0, 0), fv(1, 60.0, 25.0, 5)];
        assert_eq!(model.predict_batch(&rows).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_predictions_are_deterministic() {
        let model = PipelineModel::from_artifact(logistic()).unwrap();
        let row = fv(0, 45.07, 18.55, 3);
        let first = model.predict_one(&row).unwrap();
        for _ in 0..10 {
            assert_eq!(model.predict_one(&row).unwrap(), first);
        }
    }

    #[test]
    fn test_tree_walks_to_leaf() {
        let model = PipelineModel::from_artifact(tree(1)).unwrap();
        let rows = [fv(0, 1.0, 1.0, 3), fv(0, 1.0, 1.0, 4)];
        assert_eq!(model.predict_batch(&rows).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_tree_leaf_class_is_passed_through_verbatim() {
        let model = PipelineModel::from_artifact(tree(7)).unwrap();
        assert_eq!(model.predict_one(&fv(0, 1.0, 1.0, 9)).unwrap(), 7);
        assert_eq!(
            model.predict_label(&fv(0, 1.0, 1.0, 9)).unwrap_err(),
            ModelError::UnexpectedOutput(7)
        );
    }

    #[test]
    fn test_schema_mismatch_fails_at_prediction_time() {
        let mut artifact = logistic();
        artifact.feature_names.swap(1, 2);

        // Structurally fine, so it loads
        let model = PipelineModel::from_artifact(artifact).unwrap();
        let err = model.predict_one(&fv(0, 1.0, 1.0, 1)).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_coefficient_length_mismatch_rejected() {
        let mut artifact = logistic();
        artifact.classifier = Classifier::LogisticRegression {
            coefficients: vec![1.0, 2.0],
            intercept: 0.0,
            threshold: 0.5,
        };
        assert!(matches!(
            PipelineModel::from_artifact(artifact),
            Err(Error::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut artifact = logistic();
        artifact.scaler.as_mut().unwrap().scale[2] = 0.0;
        assert!(PipelineModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_bad_threshold_rejected() {
        let mut artifact = logistic();
        if let Classifier::LogisticRegression { threshold, .. } = &mut artifact.classifier {
            *threshold = 1.0;
        }
        assert!(PipelineModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_tree_backward_edge_rejected() {
        let mut artifact = tree(1);
        if let Classifier::DecisionTree { nodes } = &mut artifact.classifier {
            nodes[0] = TreeNode::Split {
                feature: 0,
                threshold: 0.5,
                left: 0,
                right: 2,
            };
        }
        assert!(PipelineModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_tree_feature_out_of_range_rejected() {
        let mut artifact = tree(1);
        if let Classifier::DecisionTree { nodes } = &mut artifact.classifier {
            nodes[0] = TreeNode::Split {
                feature: 4,
                threshold: 0.5,
                left: 1,
                right: 2,
            };
        }
        assert!(PipelineModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_unsupported_format_version_rejected() {
        let mut artifact = logistic();
        artifact.format_version = 2;
        assert!(PipelineModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn test_load_round_trips_through_json_file() {
        let json = serde_json::to_string_pretty(&logistic()).unwrap();
        let file = write_temp(&json);

        let model = PipelineModel::load(file.path()).unwrap();
        assert_eq!(model.artifact(), &logistic());
        assert_eq!(model.describe().kind, "logistic_regression");
    }

    #[test]
    fn test_load_parses_tagged_tree_json() {
        let file = write_temp(
            r#"{
                "name": "tiny-tree",
                "format_version": 1,
                "feature_names": ["international_plan", "total_day_charge",
                                  "total_eve_charge", "customer_service_calls"],
                "classifier": {
                    "type": "decision_tree",
                    "nodes": [
                        {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                        {"class": 0},
                        {"class": 1}
                    ]
                }
            }"#,
        );

        let model = PipelineModel::load(file.path()).unwrap();
        assert_eq!(model.describe().kind, "decision_tree");
        assert_eq!(
            model
                .predict_batch(&[fv(0, 1.0, 1.0, 0), fv(1, 1.0, 1.0, 0)])
                .unwrap(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modelo_churn.json");
        match PipelineModel::load(&path) {
            Err(Error::ArtifactNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected ArtifactNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_load_corrupt_file() {
        let file = write_temp("{ this is not json");
        assert!(matches!(
            PipelineModel::load(file.path()),
            Err(Error::InvalidArtifact(_))
        ));
    }
}
