//! ScamBait error types

use thiserror::Error;

/// ScamBait error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External model client error
    #[error("Model error: {0}")]
    Model(String),

    /// Session error
    #[error("Session error: {0}")]
    Session(String),

    /// Callback transport error
    #[error("Callback error: {0}")]
    Callback(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for ScamBait operations
pub type Result<T> = std::result::Result<T, Error>;
