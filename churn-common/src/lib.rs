//! # Churn Common Library
//!
//! Shared code for the churn prediction services including:
//! - Feature schema and request validation
//! - The churn label and its mapping from raw model output
//! - Model abstraction and the JSON pipeline artifact loader
//! - API request/response types
//! - Configuration loading and tracing setup

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod label;
pub mod logging;
pub mod model;

pub use error::{Error, Result};
pub use features::{FeatureVector, FieldError, ValidationError, FEATURE_NAMES};
pub use label::ChurnLabel;
pub use model::{ChurnModel, ModelError, ModelInfo, PipelineModel};
