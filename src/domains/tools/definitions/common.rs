//! Common utilities shared across tool definitions.
//!
//! Argument parsing, result formatting, and the mapping of downstream
//! failures into error-marked results.

use rmcp::model::{CallToolResult, Content, JsonObject};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::core::grocy::GrocyError;
use crate::domains::tools::ToolError;

/// Parse a tool's arguments object into its params struct.
pub fn parse_params<T: DeserializeOwned>(args: JsonObject) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

/// Create an error result with a formatted message.
pub fn error_result(message: impl Into<String>) -> CallToolResult {
    let message = message.into();
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message)])
}

/// Create a success result carrying pretty-printed JSON.
pub fn json_result(value: &Value) -> CallToolResult {
    let rendered =
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    CallToolResult::success(vec![Content::text(rendered)])
}

/// Map a downstream call outcome into a result.
///
/// Downstream failures become error-marked results (so no proof token is
/// attached to them), never protocol errors.
pub fn downstream_result(outcome: Result<Value, GrocyError>) -> CallToolResult {
    match outcome {
        Ok(value) => json_result(&value),
        Err(e) => error_result(format!("Grocy call failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct DemoParams {
        product_id: u32,
    }

    fn text_of(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            RawContent::Text(text) => &text.text,
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn parse_params_accepts_valid_arguments() {
        let mut args = JsonObject::new();
        args.insert("product_id".to_string(), json!(7));
        let params: DemoParams = parse_params(args).unwrap();
        assert_eq!(params.product_id, 7);
    }

    #[test]
    fn parse_params_reports_missing_field() {
        let err = parse_params::<DemoParams>(JsonObject::new()).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(err.to_string().contains("product_id"));
    }

    #[test]
    fn downstream_error_becomes_error_result() {
        let result = downstream_result(Err(GrocyError::ResponseTooLarge {
            limit: 10,
            actual: 20,
        }));
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("exceeds"));
    }

    #[test]
    fn downstream_success_is_pretty_json() {
        let result = downstream_result(Ok(json!({ "amount": 2 })));
        assert_ne!(result.is_error, Some(true));
        assert!(text_of(&result).contains("\"amount\": 2"));
    }
}
