//! Error types for threadsift-core

use thiserror::Error;

/// Main error type for the threadsift-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transcript parse error
    #[error("parse error: {message}")]
    Parse { message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// LLM error
    #[error("LLM error: {0}")]
    Llm(String),
}

/// Result type alias for threadsift-core
pub type Result<T> = std::result::Result<T, Error>;
