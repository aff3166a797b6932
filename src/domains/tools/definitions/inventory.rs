//! Inventory (stock) tools.
//!
//! Thin wrappers over the Grocy stock endpoints: current stock, volatile
//! stock (due/overdue/missing), product details, purchase, and consume.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, Utc};
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

/// Assemble the inventory module bundle.
pub fn module() -> Result<ModuleBundle, ModuleError> {
    let definitions = vec![
        StockGetAllTool::to_tool(),
        StockGetVolatileTool::to_tool(),
        ProductGetTool::to_tool(),
        PurchaseTool::to_tool(),
        ConsumeTool::to_tool(),
    ];

    let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
    handlers.insert(StockGetAllTool::NAME.to_string(), Arc::new(StockGetAllTool));
    handlers.insert(
        StockGetVolatileTool::NAME.to_string(),
        Arc::new(StockGetVolatileTool),
    );
    handlers.insert(ProductGetTool::NAME.to_string(), Arc::new(ProductGetTool));
    handlers.insert(PurchaseTool::NAME.to_string(), Arc::new(PurchaseTool));
    handlers.insert(ConsumeTool::NAME.to_string(), Arc::new(ConsumeTool));

    let mut validators: HashMap<String, OptionsValidator> = HashMap::new();
    validators.insert(PurchaseTool::NAME.to_string(), purchase_options);
    validators.insert(ConsumeTool::NAME.to_string(), consume_options);

    Ok(ModuleBundle {
        area: "inventory",
        definitions,
        handlers,
        validators,
    })
}

// ============================================================================
// stock_get_all
// ============================================================================

/// Parameters for listing all stock (none).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockGetAllParams {}

/// List every product currently in stock.
pub struct StockGetAllTool;

impl StockGetAllTool {
    pub const NAME: &'static str = "stock_get_all";

    pub const DESCRIPTION: &'static str =
        "List all products currently in stock, with amounts and next due dates.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<StockGetAllParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for StockGetAllTool {
    async fn call(
        &self,
        _args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        Ok(downstream_result(client.get_json("stock").await))
    }
}

// ============================================================================
// stock_get_volatile
// ============================================================================

/// Parameters for the volatile-stock report.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockGetVolatileParams {
    /// Products due within this many days count as "due soon" (default 5).
    #[serde(default)]
    #[schemars(description = "Days ahead to treat products as due soon (default 5)")]
    pub due_soon_days: Option<u32>,
}

/// Report due, overdue, expired, and missing products.
pub struct StockGetVolatileTool;

impl StockGetVolatileTool {
    pub const NAME: &'static str = "stock_get_volatile";

    pub const DESCRIPTION: &'static str =
        "Report volatile stock: products due soon, overdue, expired, or below minimum amount.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<StockGetVolatileParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for StockGetVolatileTool {
    async fn call(
        &self,
        args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: StockGetVolatileParams = parse_params(args)?;
        let due_soon_days = params.due_soon_days.unwrap_or(5);
        Ok(downstream_result(
            client
                .get_json_query(
                    "stock/volatile",
                    &[("due_soon_days", due_soon_days.to_string())],
                )
                .await,
        ))
    }
}

// ============================================================================
// product_get
// ============================================================================

/// Parameters for product stock details.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProductGetParams {
    /// Grocy product id.
    #[schemars(description = "Numeric Grocy product id")]
    pub product_id: u32,
}

/// Stock details for a single product.
pub struct ProductGetTool;

impl ProductGetTool {
    pub const NAME: &'static str = "product_get";

    pub const DESCRIPTION: &'static str =
        "Get stock details for one product: amounts, locations, next due date, last price.";

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ProductGetParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait]
impl ToolHandler for ProductGetTool {
    async fn call(
        &self,
        args: JsonObject,
        _options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: ProductGetParams = parse_params(args)?;
        Ok(downstream_result(
            client
                .get_json(&format!("stock/products/{}", params.product_id))
                .await,
        ))
    }
}

// ============================================================================
// purchase
// ============================================================================

/// Parameters for registering a purchase.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PurchaseParams {
    /// Grocy product id.
    #[schemars(description = "Numeric Grocy product id")]
    pub product_id: u32,

    /// Amount to add, in the product's stock unit.
    #[schemars(description = "Amount to add, in the product's stock quantity unit")]
    pub amount: f64,

    /// Price per stock unit.
    #[serde(default)]
    #[schemars(description = "Price per stock unit (optional)")]
    pub price: Option<f64>,

    /// Best-before date (YYYY-MM-DD). Falls back to the configured
    /// `default_best_before_days` option when omitted.
    #[serde(default)]
    #[schemars(description = "Best before date as YYYY-MM-DD (optional)")]
    pub best_before_date: Option<String>,

    /// Target location id. Falls back to the configured
    /// `default_location_id` option when omitted.
    #[serde(default)]
    #[schemars(description = "Location id to store the purchase at (optional)")]
    pub location_id: Option<u32>,
}

/// Register a purchase (add product to stock).
pub struct PurchaseTool;

impl PurchaseTool {
    pub const NAME: &'static str = "purchase";

    pub const DESCRIPTION: &'static str = "Register a purchase: add an amount of a product to stock, \
         optionally with price, best-before date, and location.";

    /// Option keys this tool accepts.
    pub const ALLOWED_OPTIONS: &'static [&'static str] =
        &["default_location_id", "default_best_before_days"];

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<PurchaseParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// Validate the `purchase` options.
fn purchase_options(options: &ToolOptions) -> Result<(), OptionsError> {
    options.check_allowed(PurchaseTool::ALLOWED_OPTIONS)?;
    options.get_i64("default_location_id")?;
    options.get_i64("default_best_before_days")?;
    Ok(())
}

#[async_trait]
impl ToolHandler for PurchaseTool {
    async fn call(
        &self,
        args: JsonObject,
        options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: PurchaseParams = parse_params(args)?;

        let location_id = match params.location_id {
            Some(id) => Some(i64::from(id)),
            None => options.get_i64("default_location_id")?,
        };

        let best_before_date = match params.best_before_date {
            Some(date) => Some(date),
            None => options
                .get_i64("default_best_before_days")?
                .and_then(|days| {
                    Utc::now()
                        .date_naive()
                        .checked_add_days(Days::new(days.max(0) as u64))
                })
                .map(|date| date.format("%Y-%m-%d").to_string()),
        };

        let mut body = json!({
            "amount": params.amount,
            "transaction_type": "purchase",
        });
        if let Some(price) = params.price {
            body["price"] = json!(price);
        }
        if let Some(date) = best_before_date {
            body["best_before_date"] = json!(date);
        }
        if let Some(id) = location_id {
            body["location_id"] = json!(id);
        }

        Ok(downstream_result(
            client
                .post_json(&format!("stock/products/{}/add", params.product_id), &body)
                .await,
        ))
    }
}

// ============================================================================
// consume
// ============================================================================

/// Parameters for consuming stock.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConsumeParams {
    /// Grocy product id.
    #[schemars(description = "Numeric Grocy product id")]
    pub product_id: u32,

    /// Amount to consume, in the product's stock unit.
    #[schemars(description = "Amount to consume, in the product's stock quantity unit")]
    pub amount: f64,

    /// Mark the consumed amount as spoiled.
    #[serde(default)]
    #[schemars(description = "Mark the consumed amount as spoiled (default false)")]
    pub spoiled: bool,
}

/// Consume an amount of a product from stock.
pub struct ConsumeTool;

impl ConsumeTool {
    pub const NAME: &'static str = "consume";

    pub const DESCRIPTION: &'static str =
        "Consume an amount of a product from stock, optionally marking it as spoiled.";

    /// Option keys this tool accepts.
    pub const ALLOWED_OPTIONS: &'static [&'static str] = &["allow_subproduct_substitution"];

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ConsumeParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// Validate the `consume` options.
fn consume_options(options: &ToolOptions) -> Result<(), OptionsError> {
    options.check_allowed(ConsumeTool::ALLOWED_OPTIONS)?;
    options.get_bool("allow_subproduct_substitution")?;
    Ok(())
}

#[async_trait]
impl ToolHandler for ConsumeTool {
    async fn call(
        &self,
        args: JsonObject,
        options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError> {
        let params: ConsumeParams = parse_params(args)?;
        let allow_substitution = options
            .get_bool("allow_subproduct_substitution")?
            .unwrap_or(false);

        let body: Value = json!({
            "amount": params.amount,
            "transaction_type": "consume",
            "spoiled": params.spoiled,
            "allow_subproduct_substitution": allow_substitution,
        });

        Ok(downstream_result(
            client
                .post_json(
                    &format!("stock/products/{}/consume", params.product_id),
                    &body,
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

    fn options(value: Value) -> ToolOptions {
        match value {
            Value::Object(map) => ToolOptions::from_map(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn module_shape_is_valid() {
        let bundle = module().unwrap();
        assert!(bundle.check_shape().is_ok());
        assert_eq!(bundle.area, "inventory");
        assert_eq!(bundle.definitions.len(), 5);
        assert!(bundle.validators.contains_key("purchase"));
        assert!(bundle.validators.contains_key("consume"));
        assert!(!bundle.validators.contains_key("stock_get_all"));
    }

    #[test]
    fn purchase_options_allow_list() {
        assert!(purchase_options(&options(json!({ "default_location_id": 3 }))).is_ok());
        assert!(
            purchase_options(&options(json!({ "default_best_before_days": 14 }))).is_ok()
        );

        let err = purchase_options(&options(json!({ "location": 3 }))).unwrap_err();
        assert!(matches!(err, OptionsError::UnknownKey { ref key, .. } if key == "location"));
    }

    #[test]
    fn purchase_options_type_checked() {
        let err =
            purchase_options(&options(json!({ "default_location_id": "pantry" }))).unwrap_err();
        assert!(matches!(
            err,
            OptionsError::WrongType { ref key, expected: "integer" } if key == "default_location_id"
        ));
    }

    #[test]
    fn consume_options_type_checked() {
        assert!(
            consume_options(&options(json!({ "allow_subproduct_substitution": true }))).is_ok()
        );
        let err = consume_options(&options(json!({ "allow_subproduct_substitution": 1 })))
            .unwrap_err();
        assert!(matches!(err, OptionsError::WrongType { .. }));
    }

    #[test]
    fn purchase_params_parse() {
        let params: PurchaseParams = serde_json::from_value(json!({
            "product_id": 12,
            "amount": 2.5
        }))
        .unwrap();
        assert_eq!(params.product_id, 12);
        assert_eq!(params.amount, 2.5);
        assert!(params.price.is_none());
        assert!(params.best_before_date.is_none());
    }

    #[test]
    fn consume_params_default_spoiled() {
        let params: ConsumeParams = serde_json::from_value(json!({
            "product_id": 12,
            "amount": 1.0
        }))
        .unwrap();
        assert!(!params.spoiled);
    }

    #[test]
    fn tool_metadata_names() {
        assert_eq!(StockGetAllTool::to_tool().name, "stock_get_all");
        assert_eq!(PurchaseTool::to_tool().name, "purchase");
        assert!(ConsumeTool::to_tool().description.is_some());
    }
}
