//! Per-tool option maps and sub-configuration validation support.
//!
//! A tool's options are the non-reserved keys of its config entry. Tools
//! that declare constraints register an [`OptionsValidator`] in their module
//! bundle; the enablement resolver runs it at startup. Tools without a
//! validator accept any options unchecked.

use serde_json::{Map, Value};

use crate::core::config::{RESERVED_TOOL_KEYS, ToolEntry};

/// Validator for one tool's options map.
///
/// Registered explicitly in the module bundle under the tool's name; there
/// is no name-derived lookup.
pub type OptionsValidator = fn(&ToolOptions) -> Result<(), OptionsError>;

/// Structured sub-configuration validation failure, always naming the
/// offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    /// An option key outside the tool's allow-list.
    #[error("unknown option key {key:?} (valid keys: {})", allowed.join(", "))]
    UnknownKey { key: String, allowed: Vec<String> },

    /// An option value of the wrong primitive type.
    #[error("option {key:?} must be a {expected}")]
    WrongType { key: String, expected: &'static str },

    /// Two options that may not be set together.
    #[error("options {first:?} and {second:?} are mutually exclusive")]
    Conflict { first: String, second: String },
}

/// The options map of a single tool: its config entry minus the reserved
/// `enabled` and `proof_token` keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOptions(Map<String, Value>);

impl ToolOptions {
    /// Extract the options from a tool's config entry.
    pub fn from_entry(entry: &ToolEntry) -> Self {
        let map = entry
            .extra
            .iter()
            .filter(|(key, _)| !RESERVED_TOOL_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self(map)
    }

    /// Build options directly from a map (test construction).
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Option keys, in map order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Typed lookup: boolean option.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, OptionsError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(OptionsError::WrongType {
                key: key.to_string(),
                expected: "boolean",
            }),
        }
    }

    /// Typed lookup: integer option.
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>, OptionsError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) if n.as_i64().is_some() => Ok(n.as_i64()),
            Some(_) => Err(OptionsError::WrongType {
                key: key.to_string(),
                expected: "integer",
            }),
        }
    }

    /// Typed lookup: string option.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, OptionsError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(OptionsError::WrongType {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    /// Reject any key outside `allowed`, naming the first unknown key and
    /// listing the valid ones.
    pub fn check_allowed(&self, allowed: &[&str]) -> Result<(), OptionsError> {
        for key in self.0.keys() {
            if !allowed.contains(&key.as_str()) {
                return Err(OptionsError::UnknownKey {
                    key: key.clone(),
                    allowed: allowed.iter().map(|s| s.to_string()).collect(),
                });
            }
        }
        Ok(())
    }

    /// Enforce that two boolean flags are not both set to true.
    pub fn check_exclusive(&self, first: &str, second: &str) -> Result<(), OptionsError> {
        if self.get_bool(first)? == Some(true) && self.get_bool(second)? == Some(true) {
            return Err(OptionsError::Conflict {
                first: first.to_string(),
                second: second.to_string(),
            });
        }
        Ok(())
    }
}

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
    fn reserved_keys_excluded_from_entry() {
        let entry: ToolEntry = serde_json::from_value(json!({
            "enabled": true,
            "proof_token": "TOKEN",
            "default_location_id": 3
        }))
        .unwrap();
        let opts = ToolOptions::from_entry(&entry);
        assert_eq!(opts.get_i64("default_location_id").unwrap(), Some(3));
        assert!(opts.get("enabled").is_none());
        assert!(opts.get("proof_token").is_none());
    }

    #[test]
    fn typed_getters_report_the_field() {
        let opts = options(json!({ "flag": "yes" }));
        let err = opts.get_bool("flag").unwrap_err();
        assert_eq!(
            err,
            OptionsError::WrongType {
                key: "flag".to_string(),
                expected: "boolean"
            }
        );
        assert!(err.to_string().contains("flag"));
    }

    #[test]
    fn missing_keys_are_none() {
        let opts = ToolOptions::default();
        assert_eq!(opts.get_bool("anything").unwrap(), None);
        assert_eq!(opts.get_i64("anything").unwrap(), None);
        assert_eq!(opts.get_str("anything").unwrap(), None);
    }

    #[test]
    fn allow_list_names_unknown_key_and_valid_keys() {
        let opts = options(json!({ "a": 1, "c": 2 }));
        let err = opts.check_allowed(&["a", "b"]).unwrap_err();
        match &err {
            OptionsError::UnknownKey { key, allowed } => {
                assert_eq!(key, "c");
                assert_eq!(allowed, &["a", "b"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let rendered = err.to_string();
        assert!(rendered.contains("\"c\""));
        assert!(rendered.contains("a, b"));
    }

    #[test]
    fn exclusive_flags_conflict_only_when_both_true() {
        let both = options(json!({ "auto_merge": true, "always_new_entry": true }));
        assert!(both.check_exclusive("auto_merge", "always_new_entry").is_err());

        let one = options(json!({ "auto_merge": true, "always_new_entry": false }));
        assert!(one.check_exclusive("auto_merge", "always_new_entry").is_ok());

        let neither = ToolOptions::default();
        assert!(neither.check_exclusive("auto_merge", "always_new_entry").is_ok());
    }

    #[test]
    fn float_is_not_an_integer_option() {
        let opts = options(json!({ "default_location_id": 1.5 }));
        assert!(opts.get_i64("default_location_id").is_err());
    }
}
