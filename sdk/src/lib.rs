//! Seocore SDK
//!
//! Shared types used by the engine and by anything that talks to its HTTP
//! surface: task status, task snapshots, request/response bodies and the
//! engine error type.

/// Error types and handling
pub mod errors;

/// Task and wire types
pub mod types;

// Re-export commonly used types
pub use errors::{EngineError, ErrorExt};
pub use types::{
    AnalyzeRequest, AnalyzeResponse, ErrorResponse, LogResponse, ResultResponse, TaskOutcome,
    TaskSnapshot, TaskStatus,
};
