//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol. Tool listing and invocation are delegated to the
//! [`ToolCatalog`], which exposes only the tools the configuration enables.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use crate::domains::tools::{ToolCatalog, ToolError};

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp and answers
/// `tools/list` and `tools/call` from the configured tool catalog.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registered tools filtered to the enabled set.
    catalog: Arc<ToolCatalog>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration and catalog.
    pub fn new(config: Arc<Config>, catalog: Arc<ToolCatalog>) -> Self {
        Self { config, catalog }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    fn map_tool_error(error: ToolError) -> McpError {
        match error {
            ToolError::NotFound(_)
            | ToolError::NotEnabled(_)
            | ToolError::InvalidArguments(_)
            | ToolError::Options(_) => McpError::invalid_params(error.to_string(), None),
            ToolError::Internal(_) => McpError::internal_error(error.to_string(), None),
        }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "MCP server for a Grocy household inventory instance. Tools cover \
                 stock, shopping lists, recipes, chores, tasks, and system info."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone().into(),
                version: self.config.server.version.clone().into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self.catalog.list_definitions();
        info!(count = tools.len(), "Listing tools");
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context, request), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!("Calling tool: {}", request.name);
        let args = request.arguments.unwrap_or_default();
        self.catalog
            .invoke(&request.name, args)
            .await
            .map_err(Self::map_tool_error)
    }
}
