//! System tools: instance metadata.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{CallToolResult, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::core::grocy::GrocyClient;
use crate::domains::tools::{ModuleBundle, ModuleError, ToolError, ToolHandler, ToolOptions};

use super::common::downstream_result;

/// Assemble the system module bundle.
pub fn module() -> Result<ModuleBundle, ModuleError> {
    let definitions = vec![SystemInfoTool::to_tool(), SystemDbChangedTool::to_tool()];

    let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
    handlers.insert(SystemInfoTool::NAME.to_string(), Arc::new(SystemInfoTool));
    handlers.insert(
        SystemDbChangedTool::NAME.to_string(),
        Arc::new(SystemDbChangedTool),
    );

    Ok(ModuleBundle {
        area: "system",
        definitions,
        handlers,
        validators: HashMap::new(),
    })
}

// ============================================================================
// system_info
// ============================================================================

/// Parameters for retrieving instance info (none).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SystemInfoParams {}

/// Report the Grocy version and platform details.
pub struct SystemInfoTool;

impl SystemInfoTool {
    pub const NAME: &'static str = "system_info";

    pub const DESCRIPTION: &'static str =
        "Get version and platform information about the Grocy instance.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<SystemInfoParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for SystemInfoTool {
    async fn call(
        &self,
        _args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        Ok(downstream_result(client.get_json("system/info").await))
    }
}

// ============================================================================
// system_db_changed
// ============================================================================

/// Parameters for the last-change timestamp (none).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SystemDbChangedParams {}

/// Report when the Grocy database last changed.
pub struct SystemDbChangedTool;

impl SystemDbChangedTool {
    pub const NAME: &'static str = "system_db_changed";

    pub const DESCRIPTION: &'static str =
        "Get the timestamp of the last change to the Grocy database.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<SystemDbChangedParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for SystemDbChangedTool {
    async fn call(
        &self,
        _args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        Ok(downstream_result(
            client.get_json("system/db-changed-time").await,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
