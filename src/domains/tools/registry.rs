//! Tool registry - the aggregated catalog of all loaded modules.
//!
//! The registry is a reduce over settled module loads: one flat map each for
//! definitions, handlers, and validators, keyed by globally unique tool
//! name. Built once at startup and read-only afterwards.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rmcp::model::Tool;
use tracing::warn;

use crate::core::config::DuplicatePolicy;

use super::module::{ModuleBundle, ToolHandler};
use super::options::OptionsValidator;

/// Errors from building the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two modules declared the same tool name under the `reject` policy.
    #[error("duplicate tool name {name:?} declared by modules {first:?} and {second:?}")]
    Duplicate {
        name: String,
        first: &'static str,
        second: &'static str,
    },
}

/// The aggregated tool catalog.
pub struct ToolRegistry {
    definitions: BTreeMap<String, Tool>,
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    validators: HashMap<String, OptionsValidator>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("definitions", &self.definitions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ToolRegistry {
    /// Reduce the loaded module bundles into one catalog.
    ///
    /// Name collisions across modules follow `policy`: `Reject` (the
    /// default) fails the build naming both modules; `Overwrite` keeps the
    /// later module's tool and logs a warning.
    pub fn from_modules(
        modules: &[ModuleBundle],
        policy: DuplicatePolicy,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self {
            definitions: BTreeMap::new(),
            handlers: HashMap::new(),
            validators: HashMap::new(),
        };
        let mut declared_by: HashMap<String, &'static str> = HashMap::new();

        for module in modules {
            for definition in &module.definitions {
                let name = definition.name.to_string();

                if let Some(first) = declared_by.insert(name.clone(), module.area) {
                    match policy {
                        DuplicatePolicy::Reject => {
                            return Err(RegistryError::Duplicate {
                                name,
                                first,
                                second: module.area,
                            });
                        }
                        DuplicatePolicy::Overwrite => {
                            warn!(
                                "Tool {:?} from module {:?} overwrites the one from {:?}",
                                name, module.area, first
                            );
                            // The earlier module's validator must not apply
                            // to the replacement tool.
                            registry.validators.remove(&name);
                        }
                    }
                }

                registry.definitions.insert(name.clone(), definition.clone());
                if let Some(handler) = module.handlers.get(&name) {
                    registry.handlers.insert(name.clone(), handler.clone());
                }
                if let Some(validator) = module.validators.get(&name) {
                    registry.validators.insert(name, *validator);
                }
            }
        }

        Ok(registry)
    }

    /// All definitions, sorted by name.
    pub fn definitions(&self) -> Vec<Tool> {
        self.definitions.values().cloned().collect()
    }

    /// Look up a handler by name. Absent is `None`, not an error.
    pub fn handler(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Look up a tool's options validator, if it registered one.
    pub fn validator(&self, name: &str) -> Option<OptionsValidator> {
        self.validators.get(name).copied()
    }

    /// All known tool names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }

    /// Whether a tool name is known.
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
