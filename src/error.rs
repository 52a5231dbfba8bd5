//! Error types for loading simulation inputs.
//!
//! Only the loaders can fail. Per-frame simulation is infallible: missing
//! content degrades to `None` plus a log line, never an error.

use std::path::PathBuf;

use thiserror::Error;

/// Failure loading or validating a [`crate::config::SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Failure loading a scenario (pre-expanded entity list).
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scenario parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Failure loading an animation clip table.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read clip table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("clip table parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid clip: {0}")]
    Validation(String),
}
