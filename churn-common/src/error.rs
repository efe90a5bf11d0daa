//! Common error types for the churn services

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for churn operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while bootstrapping a service or tool
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model artifact file does not exist
    #[error("Model artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// Model artifact exists but cannot be used
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),
}
