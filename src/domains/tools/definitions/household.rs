//! Household tools: chores and tasks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{CallToolResult, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::core::grocy::GrocyClient;
use crate::domains::tools::{ModuleBundle, ModuleError, ToolError, ToolHandler, ToolOptions};

use super::common::{downstream_result, parse_params};

/// Assemble the household module bundle.
pub fn module() -> Result<ModuleBundle, ModuleError> {
    let definitions = vec![
        ChoresGetAllTool::to_tool(),
        ChoreExecuteTool::to_tool(),
        TasksGetAllTool::to_tool(),
        TaskCompleteTool::to_tool(),
    ];

    let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
    handlers.insert(ChoresGetAllTool::NAME.to_string(), Arc::new(ChoresGetAllTool));
    handlers.insert(ChoreExecuteTool::NAME.to_string(), Arc::new(ChoreExecuteTool));
    handlers.insert(TasksGetAllTool::NAME.to_string(), Arc::new(TasksGetAllTool));
    handlers.insert(TaskCompleteTool::NAME.to_string(), Arc::new(TaskCompleteTool));

    Ok(ModuleBundle {
        area: "household",
        definitions,
        handlers,
        validators: HashMap::new(),
    })
}

// ============================================================================
// chores_get_all
// ============================================================================

/// Parameters for listing chores (none).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChoresGetAllParams {}

/// List all chores with their tracking state.
pub struct ChoresGetAllTool;

impl ChoresGetAllTool {
    pub const NAME: &'static str = "chores_get_all";

    pub const DESCRIPTION: &'static str =
        "List all chores with next estimated execution times.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ChoresGetAllParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for ChoresGetAllTool {
    async fn call(
        &self,
        _args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        Ok(downstream_result(client.get_json("chores").await))
    }
}

// ============================================================================
// chore_execute
// ============================================================================

/// Parameters for tracking a chore execution.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChoreExecuteParams {
    /// Grocy chore id.
    #[schemars(description = "Numeric Grocy chore id")]
    pub chore_id: u32,

    /// User id who did the chore (defaults to the API key's user).
    #[serde(default)]
    #[schemars(description = "User id who executed the chore (optional)")]
    pub done_by: Option<u32>,
}

/// Track an execution of a chore.
pub struct ChoreExecuteTool;

impl ChoreExecuteTool {
    pub const NAME: &'static str = "chore_execute";

    pub const DESCRIPTION: &'static str = "Track an execution of a chore.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ChoreExecuteParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for ChoreExecuteTool {
    async fn call(
        &self,
        args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: ChoreExecuteParams = parse_params(args)?;
        let mut body: Value = json!({});
        if let Some(done_by) = params.done_by {
            body["done_by"] = json!(done_by);
        }
        Ok(downstream_result(
            client
                .post_json(&format!("chores/{}/execute", params.chore_id), &body)
                .await,
        ))
    }
}

// ============================================================================
// tasks_get_all
// ============================================================================

/// Parameters for listing tasks (none).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TasksGetAllParams {}

/// List all open tasks.
pub struct TasksGetAllTool;

impl TasksGetAllTool {
    pub const NAME: &'static str = "tasks_get_all";

    pub const DESCRIPTION: &'static str = "List all open tasks with their due dates.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<TasksGetAllParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for TasksGetAllTool {
    async fn call(
        &self,
        _args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        Ok(downstream_result(client.get_json("tasks").await))
    }
}

// ============================================================================
// task_complete
// ============================================================================

/// Parameters for completing a task.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TaskCompleteParams {
    /// Grocy task id.
    #[schemars(description = "Numeric Grocy task id")]
    pub task_id: u32,
}

/// Mark a task as completed.
pub struct TaskCompleteTool;

impl TaskCompleteTool {
    pub const NAME: &'static str = "task_complete";

    pub const DESCRIPTION: &'static str = "Mark a task as completed.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<TaskCompleteParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for TaskCompleteTool {
    async fn call(
        &self,
        args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: TaskCompleteParams = parse_params(args)?;
        Ok(downstream_result(
            client
                .post_json(
                    &format!("tasks/{}/complete", params.task_id),
                    &Value::Null,
                )
                .await,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn module_shape_is_valid() {
        let bundle = module().unwrap();
        assert!(bundle.check_shape().is_ok());
        assert_eq!(bundle.area, "household");
        assert_eq!(bundle.definitions.len(), 4);
    }

    #[test]
    fn chore_execute_params_optional_done_by() {
        let params: ChoreExecuteParams =
            serde_json::from_value(json!({ "chore_id": 2 })).unwrap();
        assert!(params.done_by.is_none());

        let params: ChoreExecuteParams =
            serde_json::from_value(json!({ "chore_id": 2, "done_by": 5 })).unwrap();
        assert_eq!(params.done_by, Some(5));
    }

    #[test]
    fn tool_metadata_names() {
        assert_eq!(ChoresGetAllTool::to_tool().name, "chores_get_all");
        assert_eq!(ChoreExecuteTool::to_tool().name, "chore_execute");
        assert_eq!(TasksGetAllTool::to_tool().name, "tasks_get_all");
        assert_eq!(TaskCompleteTool::to_tool().name, "task_complete");
    }
}
