//! Application-wide error types using thiserror
//!
//! Only `AppError::Config` is fatal: it aborts startup before the render
//! loop is entered. Every other variant is contained at the component
//! boundary where it occurs (dispatcher, renderer, link opener) and is
//! logged rather than propagated.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// True for errors that must terminate the process at startup
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
