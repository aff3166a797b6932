//! Grocy MCP Server Library
//!
//! This crate provides a Model Context Protocol (MCP) server exposing the
//! REST API of a Grocy household inventory instance as MCP tools.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Configuration resolution, error handling, the Grocy HTTP
//!   client, the main server handler, and the transport layer
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: tool modules, the registry, enablement resolution, and
//!     per-area tool definitions
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use grocy_mcp_server::core::{Config, EnvOverrides};
//!
//! fn main() -> anyhow::Result<()> {
//!     let env = EnvOverrides::from_process();
//!     let config = Config::load(Path::new("grocy-mcp.json"), &env)?;
//!     println!("Grocy at {}", config.grocy.base_url);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
