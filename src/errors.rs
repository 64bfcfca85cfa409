// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitepipeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template for marker {marker:?} not found at {path:?}")]
    MissingTemplate { marker: String, path: PathBuf },

    #[error("{tool} failed on {path:?}: {message}")]
    Transform {
        tool: String,
        path: PathBuf,
        message: String,
    },

    #[error("Task not found: {0}")]
    UnknownTask(String),

    #[error("Cycle detected in task graph involving '{0}'")]
    TaskCycle(String),

    #[error("Tasks '{first}' and '{second}' run concurrently but both write {claim}")]
    OverlappingOutputs {
        first: String,
        second: String,
        claim: String,
    },

    #[error("Invalid version in {path:?}: {message}")]
    Version { path: PathBuf, message: String },

    #[error("{} stage(s) failed: {}", .0.len(), .0.join(", "))]
    StagesFailed(Vec<String>),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Version parsing error: {0}")]
    Semver(#[from] semver::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SitepipeError {
    /// Attach a path to a raw `std::io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SitepipeError::Io {
            path: path.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SitepipeError>;
