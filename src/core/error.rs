//! Error types and handling for the MCP server.
//!
//! This module defines a unified error type that can represent errors from
//! all subsystems, providing consistent error handling across the entire
//! application. Configuration and enablement errors are fatal at startup;
//! everything else is returned to the caller as a structured failure.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tools domain.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::domains::tools::ToolError),

    /// Configuration resolution errors (fatal at startup).
    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),

    /// Error from the downstream Grocy service.
    #[error("Grocy error: {0}")]
    Grocy(#[from] crate::core::grocy::GrocyError),

    /// I/O errors from file operations or network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors that should not occur under normal operation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
