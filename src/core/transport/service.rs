//! Transport service - orchestrates the available transport types.

use tracing::info;

use super::{TransportConfig, TransportResult};
use crate::core::McpServer;
use crate::core::config::TransportSection;

#[cfg(feature = "stdio")]
use super::TransportError;
#[cfg(feature = "stdio")]
use rmcp::ServiceExt;

#[cfg(feature = "tcp")]
use super::tcp::TcpTransport;

/// Transport service - manages the transport layer for the MCP server.
pub struct TransportService {
    config: TransportConfig,
}

impl TransportService {
    /// Create a new transport service with the given configuration.
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Create a transport service from the resolved `transport` section.
    pub fn from_section(section: &TransportSection) -> Self {
        Self::new(TransportConfig::from_section(section))
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Start the transport with the given MCP server.
    ///
    /// This method blocks until the transport is shut down.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        info!("Starting transport: {}", self.config.description());

        match self.config {
            #[cfg(feature = "stdio")]
            TransportConfig::Stdio => Self::run_stdio(server).await,
            #[cfg(feature = "tcp")]
            TransportConfig::Tcp(cfg) => TcpTransport::new(cfg).run(server).await,
        }
    }

    /// Serve the standard MCP stdio session until the client disconnects.
    ///
    /// Logging goes to stderr; stdout carries only protocol frames.
    #[cfg(feature = "stdio")]
    async fn run_stdio(server: McpServer) -> TransportResult<()> {
        info!("Ready - speaking MCP over stdin/stdout");

        let session = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        session
            .waiting()
            .await
            .map_err(|e| TransportError::ServiceError(e.to_string()))?;

        info!("stdio session closed");
        Ok(())
    }
}
