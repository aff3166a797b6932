//! Transport configuration types.

use serde::{Deserialize, Serialize};

use crate::core::config::TransportSection;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (default for MCP).
    #[cfg(feature = "stdio")]
    Stdio,

    /// TCP socket transport with JSON-RPC messages.
    #[cfg(feature = "tcp")]
    Tcp(TcpConfig),
}

/// TCP transport configuration.
#[cfg(feature = "tcp")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
}

#[cfg(feature = "tcp")]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        {
            return Self::Stdio;
        }

        #[cfg(all(not(feature = "stdio"), feature = "tcp"))]
        {
            return Self::Tcp(TcpConfig::default());
        }

        #[cfg(not(any(feature = "stdio", feature = "tcp")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or tcp");
        }
    }
}

#[cfg(feature = "tcp")]
impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            port: 8811,
            host: default_host(),
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create a TCP transport config.
    #[cfg(feature = "tcp")]
    pub fn tcp(port: u16, host: impl Into<String>) -> Self {
        Self::Tcp(TcpConfig {
            port,
            host: host.into(),
        })
    }

    /// Build a transport config from the resolved `transport` section.
    ///
    /// The TCP listener is used only when the section enables it and the
    /// `tcp` feature is compiled in; otherwise the server speaks STDIO.
    pub fn from_section(section: &TransportSection) -> Self {
        if section.enabled {
            #[cfg(feature = "tcp")]
            {
                return Self::Tcp(TcpConfig {
                    port: section.port,
                    host: section.host.clone(),
                });
            }
            #[cfg(not(feature = "tcp"))]
            {
                tracing::warn!(
                    "TCP transport requested but the binary was built without the \
                     'tcp' feature; falling back to STDIO"
                );
            }
        }

        Self::default()
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "tcp")]
            Self::Tcp(cfg) => format!("TCP on {}:{}", cfg.host, cfg.port),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_stdio() {
        assert!(TransportConfig::default().is_stdio());
    }

    #[test]
    fn disabled_section_selects_stdio() {
        let section = TransportSection::default();
        assert!(TransportConfig::from_section(&section).is_stdio());
    }

    #[cfg(feature = "tcp")]
    #[test]
    fn enabled_section_selects_tcp() {
        let section = TransportSection {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: 9000,
        };
        let config = TransportConfig::from_section(&section);
        match config {
            TransportConfig::Tcp(tcp) => {
                assert_eq!(tcp.host, "0.0.0.0");
                assert_eq!(tcp.port, 9000);
            }
            #[allow(unreachable_patterns)]
            _ => panic!("expected TCP transport"),
        }
    }
}
