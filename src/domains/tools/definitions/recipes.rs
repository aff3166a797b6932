//! Recipe tools.
//!
//! Wrappers over the Grocy recipe endpoints: listing recipes, checking
//! fulfillment against current stock, pushing missing ingredients to the
//! shopping list, and consuming a recipe's ingredients.

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

/// Assemble the recipes module bundle.
pub fn module() -> Result<ModuleBundle, ModuleError> {
    let definitions = vec![
        RecipesGetAllTool::to_tool(),
        RecipeFulfillmentTool::to_tool(),
        RecipeAddMissingProductsTool::to_tool(),
        RecipeConsumeTool::to_tool(),
    ];

    let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
    handlers.insert(RecipesGetAllTool::NAME.to_string(), Arc::new(RecipesGetAllTool));
    handlers.insert(
        RecipeFulfillmentTool::NAME.to_string(),
        Arc::new(RecipeFulfillmentTool),
    );
    handlers.insert(
        RecipeAddMissingProductsTool::NAME.to_string(),
        Arc::new(RecipeAddMissingProductsTool),
    );
    handlers.insert(RecipeConsumeTool::NAME.to_string(), Arc::new(RecipeConsumeTool));

    Ok(ModuleBundle {
        area: "recipes",
        definitions,
        handlers,
        validators: HashMap::new(),
    })
}

// ============================================================================
// recipes_get_all
// ============================================================================

/// Parameters for listing recipes (none).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecipesGetAllParams {}

/// List all recipes.
pub struct RecipesGetAllTool;

impl RecipesGetAllTool {
    pub const NAME: &'static str = "recipes_get_all";

    pub const DESCRIPTION: &'static str = "List all recipes with their base servings.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<RecipesGetAllParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for RecipesGetAllTool {
    async fn call(
        &self,
        _args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        Ok(downstream_result(client.get_json("objects/recipes").await))
    }
}

// ============================================================================
// recipe_fulfillment
// ============================================================================

/// Parameters for a recipe fulfillment check.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecipeFulfillmentParams {
    /// Grocy recipe id.
    #[schemars(description = "Numeric Grocy recipe id")]
    pub recipe_id: u32,
}

/// Check whether current stock fulfills a recipe.
pub struct RecipeFulfillmentTool;

impl RecipeFulfillmentTool {
    pub const NAME: &'static str = "recipe_fulfillment";

    pub const DESCRIPTION: &'static str =
        "Check whether current stock fulfills a recipe and which products are missing.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<RecipeFulfillmentParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for RecipeFulfillmentTool {
    async fn call(
        &self,
        args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: RecipeFulfillmentParams = parse_params(args)?;
        Ok(downstream_result(
            client
                .get_json(&format!("recipes/{}/fulfillment", params.recipe_id))
                .await,
        ))
    }
}

// ============================================================================
// recipe_add_missing_products
// ============================================================================

/// Parameters for pushing a recipe's missing products to the shopping list.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecipeAddMissingProductsParams {
    /// Grocy recipe id.
    #[schemars(description = "Numeric Grocy recipe id")]
    pub recipe_id: u32,

    /// Product ids to leave off the shopping list.
    #[serde(default)]
    #[schemars(description = "Product ids to exclude (optional)")]
    pub excluded_product_ids: Vec<u32>,
}

/// Put a recipe's not-fulfilled products on the shopping list.
pub struct RecipeAddMissingProductsTool;

impl RecipeAddMissingProductsTool {
    pub const NAME: &'static str = "recipe_add_missing_products";

    pub const DESCRIPTION: &'static str =
        "Add all products missing for a recipe to the shopping list.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<RecipeAddMissingProductsParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for RecipeAddMissingProductsTool {
    async fn call(
        &self,
        args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: RecipeAddMissingProductsParams = parse_params(args)?;
        let body: Value = json!({ "excludedProductIds": params.excluded_product_ids });
        Ok(downstream_result(
            client
                .post_json(
                    &format!(
                        "recipes/{}/add-not-fulfilled-products-to-shoppinglist",
                        params.recipe_id
                    ),
                    &body,
                )
                .await,
        ))
    }
}

// ============================================================================
// recipe_consume
// ============================================================================

/// Parameters for consuming a recipe.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecipeConsumeParams {
    /// Grocy recipe id.
    #[schemars(description = "Numeric Grocy recipe id")]
    pub recipe_id: u32,
}

/// Consume all ingredients a recipe needs from stock.
pub struct RecipeConsumeTool;

impl RecipeConsumeTool {
    pub const NAME: &'static str = "recipe_consume";

    pub const DESCRIPTION: &'static str =
        "Consume all products a recipe needs from current stock.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<RecipeConsumeParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for RecipeConsumeTool {
    async fn call(
        &self,
        args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: RecipeConsumeParams = parse_params(args)?;
        Ok(downstream_result(
            client
                .post_json(
                    &format!("recipes/{}/consume", params.recipe_id),
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
        assert_eq!(bundle.area, "recipes");
        assert_eq!(bundle.definitions.len(), 4);
        // No recipe tool declares options.
        assert!(bundle.validators.is_empty());
    }

    #[test]
    fn add_missing_params_default_exclusions() {
        let params: RecipeAddMissingProductsParams =
            serde_json::from_value(json!({ "recipe_id": 9 })).unwrap();
        assert!(params.excluded_product_ids.is_empty());
    }

    #[test]
    fn tool_metadata_names() {
        assert_eq!(RecipesGetAllTool::to_tool().name, "recipes_get_all");
        assert_eq!(RecipeFulfillmentTool::to_tool().name, "recipe_fulfillment");
        assert_eq!(
            RecipeAddMissingProductsTool::to_tool().name,
            "recipe_add_missing_products"
        );
        assert_eq!(RecipeConsumeTool::to_tool().name, "recipe_consume");
    }
}
