//! Seocore Engine Library
//!
//! Drives a target web address through an LLM-guided analysis pipeline and
//! persists the resulting structured artifact. Used by both the `seocore`
//! binary and the integration tests.

/// Configuration management module
pub mod config;

/// Secret handling for the LLM API key
pub mod secrets;

/// LLM completion client abstraction
pub mod llm;

/// Raw page content retrieval
pub mod fetcher;

/// In-memory task registry
pub mod registry;

/// Artifact persistence
pub mod artifacts;

/// Conductor orchestration module
pub mod conductor;

/// Background task supervision
pub mod supervisor;

/// HTTP surface
pub mod server;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers for the CLI
pub mod handlers;
