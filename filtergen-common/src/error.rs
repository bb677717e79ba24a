//! Common error types for the filter compiler

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for compiler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the compiler crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialize error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required global resource (theme or sound catalog) is absent.
    /// Fatal: the run aborts before any output is written.
    #[error("Missing global resource: {0}")]
    MissingResource(String),

    /// A mapping document has no tier-definition partner (or vice versa).
    /// Non-fatal: the loader logs the pair and skips it.
    #[error("Incomplete document pair: {}", .0.display())]
    MissingPair(PathBuf),

    /// A document exists but cannot be parsed or fails validation.
    /// Non-fatal: the loader logs the document and skips it.
    #[error("Malformed document {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}
