//! Enablement resolution: cross-referencing the configured tool map against
//! the registry.
//!
//! Any tool configured `enabled = true` that the registry does not know
//! about is a fatal configuration error; every invalid name is collected and
//! reported together with the full sorted list of valid names. Registered
//! option validators run here, at startup, so a bad sub-configuration never
//! reaches request handling. An empty enabled set is legal.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{info, warn};

use crate::core::config::ToolEntry;

use super::options::{OptionsError, ToolOptions};
use super::registry::ToolRegistry;

/// Errors from enablement resolution. Fatal at startup; never exits itself.
#[derive(Debug, thiserror::Error)]
pub enum EnablementError {
    /// Enabled tool names the registry does not know.
    #[error("unknown enabled tools: {}; valid tools are: {}", unknown.join(", "), known.join(", "))]
    UnknownTools {
        unknown: Vec<String>,
        known: Vec<String>,
    },

    /// A tool's configured options failed its validator.
    #[error("invalid options for tool {tool:?}: {source}")]
    InvalidOptions {
        tool: String,
        #[source]
        source: OptionsError,
    },
}

/// The resolved enabled-tool set with per-tool options and proof tokens.
#[derive(Debug, Default)]
pub struct Enablement {
    enabled: BTreeSet<String>,
    options: HashMap<String, ToolOptions>,
    proofs: HashMap<String, String>,
}

impl Enablement {
    /// Cross-reference the configured tool map against the registry.
    pub fn resolve(
        tools: &BTreeMap<String, ToolEntry>,
        registry: &ToolRegistry,
    ) -> Result<Self, EnablementError> {
        // Collect every invalid name before failing, so the operator sees
        // the whole problem at once.
        let unknown: Vec<String> = tools
            .iter()
            .filter(|(name, entry)| entry.enabled && !registry.contains(name))
            .map(|(name, _)| name.clone())
            .collect();
        if !unknown.is_empty() {
            return Err(EnablementError::UnknownTools {
                unknown,
                known: registry.names(),
            });
        }

        let mut enablement = Self::default();
        for (name, entry) in tools {
            if !entry.enabled {
                continue;
            }

            let options = ToolOptions::from_entry(entry);
            if let Some(validator) = registry.validator(name) {
                validator(&options).map_err(|source| EnablementError::InvalidOptions {
                    tool: name.clone(),
                    source,
                })?;
            }
            if !options.is_empty() {
                enablement.options.insert(name.clone(), options);
            }

            if let Some(token) = &entry.proof_token {
                enablement.proofs.insert(name.clone(), token.clone());
            }

            enablement.enabled.insert(name.clone());
        }

        if enablement.enabled.is_empty() {
            warn!("No tools are enabled; the catalog will be empty");
        } else {
            info!("Enabled {} tools", enablement.enabled.len());
        }

        Ok(enablement)
    }

    /// Whether a tool is enabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    /// The enabled tool names, sorted.
    pub fn enabled_names(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    /// A tool's options map, if it has non-reserved keys configured.
    pub fn options(&self, name: &str) -> Option<&ToolOptions> {
        self.options.get(name)
    }

    /// A tool's configured proof token, if any.
    pub fn proof_token(&self, name: &str) -> Option<&str> {
        self.proofs.get(name).map(String::as_str)
    }

    /// Number of enabled tools.
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Whether no tools are enabled.
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::super::module::testing::test_bundle;
    use super::super::options::OptionsError;
    use super::*;
    use crate::core::config::DuplicatePolicy;
    use serde_json::json;

    fn registry(names: &[&'static str]) -> ToolRegistry {
        ToolRegistry::from_modules(&[test_bundle("test", names)], DuplicatePolicy::Reject)
            .unwrap()
    }

    fn tool_map(entries: serde_json::Value) -> BTreeMap<String, ToolEntry> {
        serde_json::from_value(entries).unwrap()
    }

    #[test]
    fn enabled_known_tools_resolve() {
        let registry = registry(&["stock_get_all", "purchase"]);
        let tools = tool_map(json!({
            "stock_get_all": { "enabled": true },
            "purchase": { "enabled": true, "proof_token": "ALPHA_TOKEN", "default_location_id": 2 }
        }));
        let enablement = Enablement::resolve(&tools, &registry).unwrap();
        assert_eq!(enablement.len(), 2);
        assert!(enablement.is_enabled("stock_get_all"));
        assert_eq!(enablement.proof_token("purchase"), Some("ALPHA_TOKEN"));
        assert_eq!(enablement.proof_token("stock_get_all"), None);
        assert!(enablement.options("stock_get_all").is_none());
        let opts = enablement.options("purchase").unwrap();
        assert_eq!(opts.get_i64("default_location_id").unwrap(), Some(2));
    }

    #[test]
    fn unknown_enabled_tool_is_fatal_and_lists_valid_names() {
        let registry = registry(&["stock_get_all"]);
        let tools = tool_map(json!({
            "unknown_op": { "enabled": true },
            "another_ghost": { "enabled": true },
            "stock_get_all": { "enabled": true }
        }));
        let err = Enablement::resolve(&tools, &registry).unwrap_err();
        match err {
            EnablementError::UnknownTools { unknown, known } => {
                assert_eq!(unknown, vec!["another_ghost", "unknown_op"]);
                assert_eq!(known, vec!["stock_get_all"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn disabled_unknown_tool_is_ignored() {
        let registry = registry(&["stock_get_all"]);
        let tools = tool_map(json!({
            "tool_from_the_future": { "enabled": false },
            "stock_get_all": { "enabled": true }
        }));
        let enablement = Enablement::resolve(&tools, &registry).unwrap();
        assert_eq!(enablement.len(), 1);
    }

    #[test]
    fn zero_enabled_tools_is_legal() {
        let registry = registry(&["stock_get_all"]);
        let enablement = Enablement::resolve(&BTreeMap::new(), &registry).unwrap();
        assert!(enablement.is_empty());
    }

    #[test]
    fn validator_runs_at_resolution() {
        fn allow_only_a_b(options: &ToolOptions) -> Result<(), OptionsError> {
            options.check_allowed(&["a", "b"])
        }

        let mut bundle = test_bundle("test", &["fussy_tool"]);
        bundle
            .validators
            .insert("fussy_tool".to_string(), allow_only_a_b);
        let registry =
            ToolRegistry::from_modules(&[bundle], DuplicatePolicy::Reject).unwrap();

        let tools = tool_map(json!({
            "fussy_tool": { "enabled": true, "a": 1, "c": 2 }
        }));
        let err = Enablement::resolve(&tools, &registry).unwrap_err();
        match err {
            EnablementError::InvalidOptions { tool, source } => {
                assert_eq!(tool, "fussy_tool");
                assert!(matches!(source, OptionsError::UnknownKey { ref key, .. } if key == "c"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tool_without_validator_accepts_any_options() {
        let registry = registry(&["lenient_tool"]);
        let tools = tool_map(json!({
            "lenient_tool": { "enabled": true, "whatever": [1, 2, 3] }
        }));
        let enablement = Enablement::resolve(&tools, &registry).unwrap();
        assert!(enablement.options("lenient_tool").is_some());
    }
}
