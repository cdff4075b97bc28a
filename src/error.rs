//! Error types for Flowcanvas.
//!
//! All errors in Flowcanvas are represented by the `FlowcanvasError` enum,
//! which provides specific variants for different error categories.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Flowcanvas operations.
///
/// Each variant represents a specific category of error that can occur
/// while editing a workflow graph or talking to the backend.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FlowcanvasError {
    /// Graph structure errors (duplicate ids, dangling references).
    #[error("{0}")]
    Graph(String),

    /// Node lookup or mutation errors.
    #[error("{0}")]
    Node(String),

    /// Edge derivation errors.
    #[error("{0}")]
    Edge(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON serialization, deserialization).
    #[error("{0}")]
    Convert(String),

    /// Backend API errors, carrying the server detail message when present.
    #[error("{0}")]
    Api(String),

    /// Schema validation errors.
    #[error("{0}")]
    Validation(String),

    /// Event-stream transport errors.
    #[error("{0}")]
    Stream(String),

    /// Template catalog errors.
    #[error("{0}")]
    Template(String),

    /// Message queue errors.
    #[error("{0}")]
    Queue(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<std::io::Error> for FlowcanvasError {
    fn from(error: std::io::Error) -> Self {
        FlowcanvasError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for FlowcanvasError {
    fn from(error: serde_json::Error) -> Self {
        FlowcanvasError::Convert(error.to_string())
    }
}

impl From<reqwest::Error> for FlowcanvasError {
    fn from(error: reqwest::Error) -> Self {
        FlowcanvasError::Api(error.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for FlowcanvasError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        FlowcanvasError::Stream(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for FlowcanvasError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        FlowcanvasError::Validation(error.to_string())
    }
}
