//! Shopping list tools.
//!
//! Wrappers over the Grocy shopping list endpoints: listing items, adding
//! and removing products, and clearing a list.

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
use crate::domains::tools::{
    ModuleBundle, ModuleError, OptionsError, OptionsValidator, ToolError, ToolHandler,
    ToolOptions,
};

use super::common::{downstream_result, parse_params};

/// Assemble the shopping module bundle.
pub fn module() -> Result<ModuleBundle, ModuleError> {
    let definitions = vec![
        ShoppingListGetTool::to_tool(),
        ShoppingListAddProductTool::to_tool(),
        ShoppingListRemoveProductTool::to_tool(),
        ShoppingListClearTool::to_tool(),
    ];

    let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
    handlers.insert(
        ShoppingListGetTool::NAME.to_string(),
        Arc::new(ShoppingListGetTool),
    );
    handlers.insert(
        ShoppingListAddProductTool::NAME.to_string(),
        Arc::new(ShoppingListAddProductTool),
    );
    handlers.insert(
        ShoppingListRemoveProductTool::NAME.to_string(),
        Arc::new(ShoppingListRemoveProductTool),
    );
    handlers.insert(
        ShoppingListClearTool::NAME.to_string(),
        Arc::new(ShoppingListClearTool),
    );

    let mut validators: HashMap<String, OptionsValidator> = HashMap::new();
    validators.insert(
        ShoppingListAddProductTool::NAME.to_string(),
        shopping_list_add_options,
    );

    Ok(ModuleBundle {
        area: "shopping",
        definitions,
        handlers,
        validators,
    })
}

// ============================================================================
// shopping_list_get
// ============================================================================

/// Parameters for listing shopping list items (none).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ShoppingListGetParams {}

/// List all shopping list items.
pub struct ShoppingListGetTool;

impl ShoppingListGetTool {
    pub const NAME: &'static str = "shopping_list_get";

    pub const DESCRIPTION: &'static str =
        "List all shopping list items across all shopping lists.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ShoppingListGetParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for ShoppingListGetTool {
    async fn call(
        &self,
        _args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        Ok(downstream_result(
            client.get_json("objects/shopping_list").await,
        ))
    }
}

// ============================================================================
// shopping_list_add_product
// ============================================================================

/// Parameters for adding a product to a shopping list.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ShoppingListAddProductParams {
    /// Grocy product id.
    #[schemars(description = "Numeric Grocy product id")]
    pub product_id: u32,

    /// Amount to add (default 1).
    #[serde(default = "default_amount")]
    #[schemars(description = "Amount to add to the list (default 1)")]
    pub amount: f64,

    /// Target shopping list id (default 1, the primary list).
    #[serde(default = "default_list_id")]
    #[schemars(description = "Shopping list id (default 1)")]
    pub list_id: u32,
}

fn default_amount() -> f64 {
    1.0
}

fn default_list_id() -> u32 {
    1
}

/// Add a product to a shopping list.
pub struct ShoppingListAddProductTool;

impl ShoppingListAddProductTool {
    pub const NAME: &'static str = "shopping_list_add_product";

    pub const DESCRIPTION: &'static str =
        "Add an amount of a product to a shopping list.";

    /// Option keys this tool accepts. `auto_merge` folds the amount into an
    /// existing entry for the same product; `always_new_entry` forces a new
    /// row. They cannot both be set.
    pub const ALLOWED_OPTIONS: &'static [&'static str] = &["auto_merge", "always_new_entry"];

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ShoppingListAddProductParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// Validate the `shopping_list_add_product` options.
fn shopping_list_add_options(options: &ToolOptions) -> Result<(), OptionsError> {
    options.check_allowed(ShoppingListAddProductTool::ALLOWED_OPTIONS)?;
    options.get_bool("auto_merge")?;
    options.get_bool("always_new_entry")?;
    options.check_exclusive("auto_merge", "always_new_entry")?;
    Ok(())
}

#[async_trait]
impl ToolHandler for ShoppingListAddProductTool {
    async fn call(
        &self,
        args: JsonObject,
        options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: ShoppingListAddProductParams = parse_params(args)?;

        let mut body: Value = json!({
            "product_id": params.product_id,
            "product_amount": params.amount,
            "list_id": params.list_id,
        });
        if options.get_bool("auto_merge")? == Some(true) {
            body["auto_merge"] = json!(true);
        }

        Ok(downstream_result(
            client
                .post_json("stock/shoppinglist/add-product", &body)
                .await,
        ))
    }
}

// ============================================================================
// shopping_list_remove_product
// ============================================================================

/// Parameters for removing a product from a shopping list.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ShoppingListRemoveProductParams {
    /// Grocy product id.
    #[schemars(description = "Numeric Grocy product id")]
    pub product_id: u32,

    /// Amount to remove (default 1).
    #[serde(default = "default_amount")]
    #[schemars(description = "Amount to remove from the list (default 1)")]
    pub amount: f64,

    /// Target shopping list id (default 1, the primary list).
    #[serde(default = "default_list_id")]
    #[schemars(description = "Shopping list id (default 1)")]
    pub list_id: u32,
}

/// Remove a product from a shopping list.
pub struct ShoppingListRemoveProductTool;

impl ShoppingListRemoveProductTool {
    pub const NAME: &'static str = "shopping_list_remove_product";

    pub const DESCRIPTION: &'static str =
        "Remove an amount of a product from a shopping list.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ShoppingListRemoveProductParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for ShoppingListRemoveProductTool {
    async fn call(
        &self,
        args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: ShoppingListRemoveProductParams = parse_params(args)?;

        let body: Value = json!({
            "product_id": params.product_id,
            "product_amount": params.amount,
            "list_id": params.list_id,
        });

        Ok(downstream_result(
            client
                .post_json("stock/shoppinglist/remove-product", &body)
                .await,
        ))
    }
}

// ============================================================================
// shopping_list_clear
// ============================================================================

/// Parameters for clearing a shopping list.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ShoppingListClearParams {
    /// Shopping list id to clear (default 1, the primary list).
    #[serde(default = "default_list_id")]
    #[schemars(description = "Shopping list id to clear (default 1)")]
    pub list_id: u32,
}

/// Remove every item from a shopping list.
pub struct ShoppingListClearTool;

impl ShoppingListClearTool {
    pub const NAME: &'static str = "shopping_list_clear";

    pub const DESCRIPTION: &'static str = "Remove all items from a shopping list.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ShoppingListClearParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for ShoppingListClearTool {
    async fn call(
        &self,
        args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: ShoppingListClearParams = parse_params(args)?;
        let body: Value = json!({ "list_id": params.list_id });
        Ok(downstream_result(
            client.post_json("stock/shoppinglist/clear", &body).await,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
