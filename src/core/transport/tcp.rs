//! TCP transport implementation.
//!
//! Serves JSON-RPC over raw TCP. Each accepted connection gets its own MCP
//! session on a spawned task, so one slow client cannot stall the accept
//! loop or the other sessions.

use std::net::SocketAddr;
use std::time::Duration;

use rmcp::ServiceExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use super::{TransportError, TransportResult, config::TcpConfig};
use crate::core::McpServer;

/// Pause after a failed accept so a persistent error does not spin the loop.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// TCP transport handler.
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a new TCP transport with the given config.
    pub fn new(config: TcpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Bind the listener and serve clients until the process is stopped.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!(%addr, "Ready - accepting MCP clients over TCP");

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };

            // Tool calls are small request/response frames; Nagle buffering
            // only adds latency here.
            if let Err(e) = stream.set_nodelay(true) {
                warn!(%peer, error = %e, "Could not set TCP_NODELAY");
            }

            let server = server.clone();
            tokio::spawn(Self::serve_client(server, stream, peer));
        }
    }

    /// Run one client's MCP session to completion.
    async fn serve_client(server: McpServer, stream: TcpStream, peer: SocketAddr) {
        let session = match server.serve(stream).await {
            Ok(session) => {
                info!(%peer, "Client session started");
                session
            }
            Err(e) => {
                warn!(%peer, error = %e, "Client handshake failed");
                return;
            }
        };

        match session.waiting().await {
            Ok(_) => info!(%peer, "Client disconnected"),
            Err(e) => warn!(%peer, error = %e, "Client session aborted"),
        }
    }
}
