//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while loading a snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),

    #[error("Duplicate object reference {0:#x} in snapshot")]
    DuplicateObject(u64),
}

/// Errors that can occur while exporting records
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Destination rejected batch: {0}")]
    Rejected(String),
}

/// Errors that abort a summary run
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Cannot walk heap, aborting")]
    HeapNotWalkable,

    #[error("Run cancelled after {0} objects")]
    Cancelled(u64),

    #[error("Export failed: {0}")]
    Sink(#[from] OutputError),
}
