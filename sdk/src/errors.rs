//! Error types and handling
//!
//! This module provides the error type used at the edges of the engine:
//! configuration loading, process bootstrap and the HTTP server. Pipeline
//! failures never surface here; they are recorded on the task itself.
//!
//! All errors implement the `ErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages never carry the LLM API key. Values that may contain one
//! are scrubbed by the engine before they are wrapped here.

use thiserror::Error;

/// Trait for engine error extensions
///
/// Provides additional context for errors, including user-friendly hints
/// and recoverability information.
pub trait ErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors require a configuration change or a restart.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, ErrorExt};
///
/// let error = EngineError::MissingApiKey("PROXYAPI_KEY".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(!error.is_recoverable());
///
/// let error = EngineError::TaskNotFound("abc".to_string());
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),

    #[error("Path canonicalization failed for {0:?}: {1}")]
    PathCanonicalization(std::path::PathBuf, String),

    // LLM provider errors
    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    // Task errors
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Shutting down, no new tasks accepted")]
    ShuttingDown,

    // Server errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::MissingApiKey(_) => "Export the LLM API key before starting seocore",
            Self::PathCanonicalization(_, _) => "Invalid path specified",
            Self::LLMProvider(_) => "LLM provider unavailable. Check your API key and network",
            Self::TaskNotFound(_) => "No task with this id. Submit a new analysis",
            Self::InvalidRequest(_) => "The request body is missing required fields",
            Self::ShuttingDown => "The service is stopping. Retry once it is back",
            Self::Network(_) => "Network operation failed. Check the bind address",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Config(_) | Self::MissingApiKey(_) | Self::PathCanonicalization(_, _)
        )
    }
}
