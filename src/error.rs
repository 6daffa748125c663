//! Error types for Squadflow.
//!
//! All errors in Squadflow are represented by the `SquadflowError` enum.
//! Structural edits to a call graph never produce errors; they are accepted
//! no-ops instead, so the variants here cover configuration, conversion and
//! the persistence boundary.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Squadflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum SquadflowError {
    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Workflow record errors.
    #[error("{0}")]
    Workflow(String),

    /// Node lookup errors.
    #[error("{0}")]
    Node(String),

    /// Edge lookup errors.
    #[error("{0}")]
    Edge(String),

    /// Errors reported by the persistence collaborator.
    #[error("{0}")]
    Store(String),

    /// Editor lifecycle errors (operating on a closed editor, etc.).
    #[error("{0}")]
    Editor(String),

    /// A collaborator could not resolve the requested id.
    #[error("{0} not found")]
    NotFound(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),

    /// Notification queue errors.
    #[error("{0}")]
    Queue(String),
}

impl From<SquadflowError> for String {
    fn from(val: SquadflowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for SquadflowError {
    fn from(error: std::io::Error) -> Self {
        SquadflowError::IoError(error.to_string())
    }
}

impl From<SquadflowError> for std::io::Error {
    fn from(val: SquadflowError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for SquadflowError {
    fn from(error: serde_json::Error) -> Self {
        SquadflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for SquadflowError {
    fn from(error: toml::de::Error) -> Self {
        SquadflowError::Config(error.to_string())
    }
}
