//! Tool-specific error types.

use thiserror::Error;

use super::options::OptionsError;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool is not in the registry.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The tool exists but is not enabled in the configuration.
    #[error("Tool not enabled: {0}")]
    NotEnabled(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool's configured options failed validation.
    #[error("Invalid options: {0}")]
    Options(#[from] OptionsError),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "not enabled" error.
    pub fn not_enabled(name: impl Into<String>) -> Self {
        Self::NotEnabled(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
