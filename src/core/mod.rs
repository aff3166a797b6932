//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the MCP server,
//! including error handling, configuration, the Grocy HTTP client, server
//! lifecycle management, and transport layer abstractions.

pub mod config;
pub mod error;
pub mod grocy;
pub mod server;
pub mod transport;

pub use config::{Config, ConfigError, EnvOverrides};
pub use error::{Error, Result};
pub use grocy::{GrocyClient, GrocyError};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
