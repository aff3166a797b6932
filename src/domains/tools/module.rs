//! Tool module bundles and startup discovery.
//!
//! A module is a self-contained functional area (inventory, shopping,
//! recipes, household, system) exposing its tool definitions, handlers, and
//! optional option validators as one [`ModuleBundle`]. Modules are
//! compiled-in constructors registered in a static loader table; there is no
//! filesystem scanning or name-derived path construction.
//!
//! Discovery runs every loader independently: a module that fails to load,
//! or loads with an invalid shape, is logged and skipped without affecting
//! the others. The outcome of the first discovery is cached for the life of
//! the [`ModuleDiscovery`] value.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use rmcp::model::{CallToolResult, JsonObject, Tool};
use tracing::{debug, warn};

use crate::core::grocy::GrocyClient;

use super::definitions;
use super::error::ToolError;
use super::options::{OptionsValidator, ToolOptions};

/// A tool's executable body.
///
/// Handlers are stateless: everything they need arrives as arguments, the
/// tool's resolved options, and the shared downstream client. The registry
/// holds an `Arc` reference, not a copy.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with the given arguments.
    async fn call(
        &self,
        args: JsonObject,
        options: &ToolOptions,
        client: &GrocyClient,
    ) -> Result<CallToolResult, ToolError>;
}

/// Everything one functional area contributes to the catalog.
pub struct ModuleBundle {
    /// Functional area name, used only for logging and duplicate reports.
    pub area: &'static str,

    /// Tool metadata, one entry per tool.
    pub definitions: Vec<Tool>,

    /// Handlers keyed by tool name.
    pub handlers: HashMap<String, Arc<dyn ToolHandler>>,

    /// Option validators keyed by tool name; most tools have none.
    pub validators: HashMap<String, OptionsValidator>,
}

impl ModuleBundle {
    /// Structural shape check: a valid module exposes a non-empty list of
    /// definitions, a non-empty handler map, and a handler for every
    /// definition it declares.
    pub fn check_shape(&self) -> Result<(), ModuleError> {
        if self.definitions.is_empty() {
            return Err(ModuleError::InvalidShape {
                area: self.area,
                reason: "no definitions".to_string(),
            });
        }
        if self.handlers.is_empty() {
            return Err(ModuleError::InvalidShape {
                area: self.area,
                reason: "no handlers".to_string(),
            });
        }
        for definition in &self.definitions {
            if !self.handlers.contains_key(definition.name.as_ref()) {
                return Err(ModuleError::InvalidShape {
                    area: self.area,
                    reason: format!("definition {:?} has no handler", definition.name),
                });
            }
        }
        Ok(())
    }
}

/// Errors from loading a single module. Never fatal to discovery as a whole.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// The module constructor itself failed.
    #[error("module {area:?} failed to load: {message}")]
    LoadFailed { area: &'static str, message: String },

    /// The module loaded but does not look like a tool module.
    #[error("module {area:?} has an invalid shape: {reason}")]
    InvalidShape { area: &'static str, reason: String },
}

/// A module constructor.
pub type ModuleLoader = fn() -> Result<ModuleBundle, ModuleError>;

/// Startup discovery over a table of module loaders.
pub struct ModuleDiscovery {
    loaders: Vec<ModuleLoader>,
    cache: OnceLock<Vec<ModuleBundle>>,
}

impl ModuleDiscovery {
    /// Discovery over an explicit loader table.
    pub fn new(loaders: Vec<ModuleLoader>) -> Self {
        Self {
            loaders,
            cache: OnceLock::new(),
        }
    }

    /// Discovery over all built-in functional areas.
    pub fn builtin() -> Self {
        Self::new(vec![
            definitions::inventory::module,
            definitions::shopping::module,
            definitions::recipes::module,
            definitions::household::module,
            definitions::system::module,
        ])
    }

    /// Run every loader and return the bundles that loaded successfully.
    ///
    /// The first call does the work; repeated calls return the cached
    /// outcome. A failing module is logged and excluded, never propagated.
    pub fn discover(&self) -> &[ModuleBundle] {
        self.cache.get_or_init(|| {
            let mut bundles = Vec::with_capacity(self.loaders.len());
            for loader in &self.loaders {
                match loader().and_then(|bundle| {
                    bundle.check_shape()?;
                    Ok(bundle)
                }) {
                    Ok(bundle) => {
                        debug!(
                            "Loaded module {:?} with {} tools",
                            bundle.area,
                            bundle.definitions.len()
                        );
                        bundles.push(bundle);
                    }
                    Err(e) => {
                        warn!("Skipping module: {}", e);
                    }
                }
            }
            bundles
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared test construction helpers for the tools domain.

    use super::*;
    use rmcp::model::Content;

    /// Minimal tool metadata with an empty input schema.
    pub fn test_tool(name: &str) -> Tool {
        Tool {
            name: name.to_string().into(),
            description: Some(format!("test tool {name}").into()),
            input_schema: Arc::new(JsonObject::new()),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Handler that echoes a fixed message without touching the client.
    pub struct EchoHandler(pub &'static str);

    #[async_trait]
    impl ToolHandler for EchoHandler {
        async fn call(
            &self,
            _args: JsonObject,
            _options: &ToolOptions,
            _client: &GrocyClient,
        ) -> Result<CallToolResult, ToolError> {
            Ok(CallToolResult::success(vec![Content::text(
                self.0.to_string(),
            )]))
        }
    }

    /// Handler that always produces an error-marked result.
    pub struct FailingHandler;

    #[async_trait]
    impl ToolHandler for FailingHandler {
        async fn call(
            &self,
            _args: JsonObject,
            _options: &ToolOptions,
            _client: &GrocyClient,
        ) -> Result<CallToolResult, ToolError> {
            Ok(CallToolResult::error(vec![Content::text(
                "downstream failure".to_string(),
            )]))
        }
    }

    /// Bundle with echo handlers for the given tool names.
    pub fn test_bundle(area: &'static str, names: &[&'static str]) -> ModuleBundle {
        let definitions = names.iter().map(|n| test_tool(n)).collect();
        let handlers = names
            .iter()
            .map(|n| {
                (
                    n.to_string(),
                    Arc::new(EchoHandler(n)) as Arc<dyn ToolHandler>,
                )
            })
            .collect();
        ModuleBundle {
            area,
            definitions,
            handlers,
            validators: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn good_module() -> Result<ModuleBundle, ModuleError> {
        Ok(test_bundle("good", &["good_tool"]))
    }

    fn failing_module() -> Result<ModuleBundle, ModuleError> {
        Err(ModuleError::LoadFailed {
            area: "broken",
            message: "boom".to_string(),
        })
    }

    fn empty_module() -> Result<ModuleBundle, ModuleError> {
        Ok(ModuleBundle {
            area: "empty",
            definitions: Vec::new(),
            handlers: HashMap::new(),
            validators: HashMap::new(),
        })
    }

    #[test]
    fn one_failing_module_does_not_block_the_others() {
        let discovery =
            ModuleDiscovery::new(vec![good_module, failing_module, good_module]);
        let bundles = discovery.discover();
        assert_eq!(bundles.len(), 2);
        assert!(bundles.iter().all(|b| b.area == "good"));
    }

    #[test]
    fn module_without_definitions_or_handlers_is_rejected() {
        let discovery = ModuleDiscovery::new(vec![empty_module, good_module]);
        assert_eq!(discovery.discover().len(), 1);
    }

    #[test]
    fn definition_without_handler_is_rejected() {
        let bundle = ModuleBundle {
            area: "odd",
            definitions: vec![test_tool("present"), test_tool("missing")],
            handlers: [(
                "present".to_string(),
                Arc::new(EchoHandler("present")) as Arc<dyn ToolHandler>,
            )]
            .into_iter()
            .collect(),
            validators: HashMap::new(),
        };
        assert!(bundle.check_shape().is_err());
    }

    #[test]
    fn discovery_outcome_is_cached() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        fn counting_module() -> Result<ModuleBundle, ModuleError> {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(test_bundle("counted", &["counted_tool"]))
        }

        let discovery = ModuleDiscovery::new(vec![counting_module]);
        discovery.discover();
        discovery.discover();
        discovery.discover();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn builtin_areas_all_load() {
        let discovery = ModuleDiscovery::builtin();
        let bundles = discovery.discover();
        assert_eq!(bundles.len(), 5);
        let areas: Vec<_> = bundles.iter().map(|b| b.area).collect();
        assert!(areas.contains(&"inventory"));
        assert!(areas.contains(&"shopping"));
        assert!(areas.contains(&"recipes"));
        assert!(areas.contains(&"household"));
        assert!(areas.contains(&"system"));
    }
}
