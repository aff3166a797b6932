//! Tool catalog - the dispatch facade consumed by the transport layer.
//!
//! Ties together the registry (what exists), the enablement resolution (what
//! is callable and with which options), and the shared downstream client.
//! Disabled tools are invisible: they are absent from listings and their
//! invocation is rejected.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject, Tool};
use tracing::{info, instrument};

use crate::core::grocy::GrocyClient;

use super::annotate::annotate;
use super::enablement::Enablement;
use super::error::ToolError;
use super::module::ToolHandler;
use super::options::ToolOptions;
use super::registry::ToolRegistry;

/// The dispatch facade over registry + enablement + downstream client.
pub struct ToolCatalog {
    registry: ToolRegistry,
    enablement: Enablement,
    client: Arc<GrocyClient>,
}

impl ToolCatalog {
    /// Assemble the catalog from its resolved parts.
    pub fn new(registry: ToolRegistry, enablement: Enablement, client: Arc<GrocyClient>) -> Self {
        Self {
            registry,
            enablement,
            client,
        }
    }

    /// Definitions of the enabled tools, sorted by name.
    pub fn list_definitions(&self) -> Vec<Tool> {
        self.registry
            .definitions()
            .into_iter()
            .filter(|tool| self.enablement.is_enabled(tool.name.as_ref()))
            .collect()
    }

    /// Handler for an enabled tool. Disabled or unknown names are absent.
    pub fn handler(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        if !self.enablement.is_enabled(name) {
            return None;
        }
        self.registry.handler(name)
    }

    /// A tool's resolved options (empty if none were configured).
    pub fn options(&self, name: &str) -> ToolOptions {
        self.enablement.options(name).cloned().unwrap_or_default()
    }

    /// Number of enabled tools.
    pub fn enabled_len(&self) -> usize {
        self.enablement.len()
    }

    /// Invoke a tool: enablement check, handler lookup, execution with the
    /// tool's options, then proof-token annotation of the result.
    #[instrument(skip(self, args))]
    pub async fn invoke(
        &self,
        name: &str,
        args: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        if !self.registry.contains(name) {
            return Err(ToolError::not_found(name));
        }
        if !self.enablement.is_enabled(name) {
            return Err(ToolError::not_enabled(name));
        }

        let handler = self
            .registry
            .handler(name)
            .ok_or_else(|| ToolError::internal(format!("no handler registered for {name:?}")))?;

        info!("Invoking tool {}", name);
        let options = self.options(name);
        let result = handler.call(args, &options, &self.client).await?;

        Ok(annotate(result, self.enablement.proof_token(name)))
    }
}
