//! Configuration resolution for the MCP server.
//!
//! Configuration is layered: schema defaults, then an optional JSON file,
//! then environment-variable overrides on the leaves of the `transport` and
//! `grocy` sections. Resolution produces one immutable [`Config`] value that
//! is built once at process entry and passed by reference into every
//! component; the resolver itself never terminates the process, it returns a
//! typed [`ConfigError`] and leaves the exit decision to `main`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default config file path, overridable via `GROCY_MCP_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "grocy-mcp.json";

/// Reserved keys in a tool's config entry. Everything else is an
/// operation-specific option handed to that tool's validator.
pub const RESERVED_TOOL_KEYS: &[&str] = &["enabled", "proof_token"];

const DEFAULT_RESPONSE_SIZE_LIMIT: usize = 4 * 1024 * 1024;

/// Main configuration structure for the MCP server.
///
/// Sections mirror the config file shape; unknown tool names in `tools` are
/// accepted here (forward-compatible) and only checked against the registry
/// during enablement resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration (stdio by default, TCP when enabled).
    pub transport: TransportSection,

    /// Downstream Grocy service connection settings.
    pub grocy: GrocyConfig,

    /// Registry build behavior.
    pub registry: RegistryConfig,

    /// Per-tool enablement and options, keyed by tool name.
    pub tools: BTreeMap<String, ToolEntry>,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Transport section of the config file.
///
/// `enabled = false` means the standard MCP stdio transport; `enabled = true`
/// serves JSON-RPC over TCP on `host:port` (requires the `tcp` feature).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSection {
    /// Whether the network transport is enabled.
    pub enabled: bool,

    /// Host address to bind to.
    pub host: String,

    /// Port number to listen on (1-65535).
    pub port: u16,
}

/// Downstream Grocy service connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrocyConfig {
    /// Base URL of the Grocy REST API, e.g. `http://localhost:9283/api`.
    pub base_url: String,

    /// Grocy API key, sent as the `GROCY-API-KEY` header.
    pub api_key: Option<String>,

    /// Whether to verify TLS certificates on the downstream connection.
    pub verify_tls: bool,

    /// Ceiling on downstream response body size, in bytes.
    pub response_size_limit: usize,
}

/// Custom Debug implementation to redact the API key from logs.
impl std::fmt::Debug for GrocyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrocyConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("verify_tls", &self.verify_tls)
            .field("response_size_limit", &self.response_size_limit)
            .finish()
    }
}

/// Registry build behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// What to do when two modules declare the same tool name.
    pub duplicate_policy: DuplicatePolicy,
}

/// Policy for duplicate tool names across modules.
///
/// Silently shadowing one module's tool with another's is a correctness
/// hazard, so `Reject` is the default; `Overwrite` keeps last-write-wins
/// behind a warning for installations that rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Duplicate names are a startup-fatal registry error.
    #[default]
    Reject,

    /// The later module silently wins; a warning is logged.
    Overwrite,
}

/// One tool's entry in the `tools` map.
///
/// `enabled` and `proof_token` are reserved; all other keys are collected
/// into `extra` and become the tool's options map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolEntry {
    /// Whether this tool is callable. Tools absent from the config, or
    /// present with `enabled = false`, are invisible to clients.
    #[serde(default)]
    pub enabled: bool,

    /// Optional acknowledgment string appended to successful results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_token: Option<String>,

    /// Operation-specific option keys, validated by the tool's validator.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "grocy-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "127.0.0.1".to_string(),
            port: 8811,
        }
    }
}

impl Default for GrocyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9283/api".to_string(),
            api_key: None,
            verify_tls: true,
            response_size_limit: DEFAULT_RESPONSE_SIZE_LIMIT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            transport: TransportSection::default(),
            grocy: GrocyConfig::default(),
            registry: RegistryConfig::default(),
            tools: BTreeMap::new(),
        }
    }
}

// ============================================================================
// Environment overrides
// ============================================================================

/// Snapshot of the recognized override variables.
///
/// Captured once in `main` and passed into [`Config::resolve`], so tests can
/// resolve several configurations in one process without mutating the real
/// environment. Values are kept as raw strings; parse failures surface as
/// violations on the field they target.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub verify_tls: Option<String>,
    pub response_size_limit: Option<String>,
    pub transport_enabled: Option<String>,
    pub transport_port: Option<String>,
    pub server_name: Option<String>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    /// Capture the recognized variables from the process environment.
    pub fn from_process() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            base_url: var("GROCY_BASE_URL"),
            api_key: var("GROCY_API_KEY"),
            verify_tls: var("GROCY_VERIFY_TLS"),
            response_size_limit: var("GROCY_RESPONSE_SIZE_LIMIT"),
            transport_enabled: var("MCP_TRANSPORT_ENABLED"),
            transport_port: var("MCP_TRANSPORT_PORT"),
            server_name: var("MCP_SERVER_NAME"),
            log_level: var("MCP_LOG_LEVEL"),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A single validation violation, with the path of the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the field, e.g. `grocy.base_url`.
    pub path: String,

    /// Human-readable description of what is wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors produced by configuration resolution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected schema.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// One or more fields failed validation. Every violation is collected
    /// before this is returned, so the caller can report all of them.
    #[error("invalid configuration: {}", format_violations(.0))]
    Invalid(Vec<Violation>),
}

impl ConfigError {
    /// All violations carried by this error (empty for non-validation errors).
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid(v) => v,
            _ => &[],
        }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Resolution
// ============================================================================

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and resolve configuration from a file path plus an environment
    /// snapshot. A missing file is not an error: defaults apply.
    pub fn load(path: &Path, env: &EnvOverrides) -> Result<Self, ConfigError> {
        let file = match std::fs::read_to_string(path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        Self::resolve(file.as_deref(), env)
    }

    /// Resolve configuration from optional file contents and an environment
    /// snapshot. Precedence: environment beats file beats default.
    ///
    /// All validation violations are collected before failing so operators
    /// see every problem at once rather than one per restart.
    pub fn resolve(file: Option<&str>, env: &EnvOverrides) -> Result<Self, ConfigError> {
        let mut config = match file {
            // Missing or empty file: all defaults.
            None => Self::default(),
            Some(contents) if contents.trim().is_empty() => Self::default(),
            Some(contents) => serde_json::from_str(contents)?,
        };

        let mut violations = Vec::new();
        config.apply_env(env, &mut violations);
        config.validate(&mut violations);

        if violations.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(violations))
        }
    }

    /// Apply environment overrides onto the leaves of `transport` and
    /// `grocy` (plus server name and log level).
    fn apply_env(&mut self, env: &EnvOverrides, violations: &mut Vec<Violation>) {
        if let Some(url) = &env.base_url {
            self.grocy.base_url = url.clone();
        }
        if let Some(key) = &env.api_key {
            self.grocy.api_key = Some(key.clone());
        }
        if let Some(raw) = &env.verify_tls {
            match parse_bool(raw) {
                Some(v) => self.grocy.verify_tls = v,
                None => violations.push(Violation {
                    path: "grocy.verify_tls".to_string(),
                    message: format!("GROCY_VERIFY_TLS is not a boolean: {raw:?}"),
                }),
            }
        }
        if let Some(raw) = &env.response_size_limit {
            match raw.parse::<usize>() {
                Ok(v) => self.grocy.response_size_limit = v,
                Err(_) => violations.push(Violation {
                    path: "grocy.response_size_limit".to_string(),
                    message: format!("GROCY_RESPONSE_SIZE_LIMIT is not an integer: {raw:?}"),
                }),
            }
        }
        if let Some(raw) = &env.transport_enabled {
            match parse_bool(raw) {
                Some(v) => self.transport.enabled = v,
                None => violations.push(Violation {
                    path: "transport.enabled".to_string(),
                    message: format!("MCP_TRANSPORT_ENABLED is not a boolean: {raw:?}"),
                }),
            }
        }
        if let Some(raw) = &env.transport_port {
            match raw.parse::<u16>() {
                Ok(v) => self.transport.port = v,
                Err(_) => violations.push(Violation {
                    path: "transport.port".to_string(),
                    message: format!("MCP_TRANSPORT_PORT is not a port number: {raw:?}"),
                }),
            }
        }
        if let Some(name) = &env.server_name {
            self.server.name = name.clone();
        }
        if let Some(level) = &env.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate field ranges and formats, appending every violation found.
    fn validate(&self, violations: &mut Vec<Violation>) {
        if self.transport.port == 0 {
            violations.push(Violation {
                path: "transport.port".to_string(),
                message: "port must be in 1-65535".to_string(),
            });
        }

        match reqwest::Url::parse(&self.grocy.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => violations.push(Violation {
                path: "grocy.base_url".to_string(),
                message: format!("unsupported URL scheme {:?}", url.scheme()),
            }),
            Err(e) => violations.push(Violation {
                path: "grocy.base_url".to_string(),
                message: format!("malformed URL: {e}"),
            }),
        }

        if self.grocy.response_size_limit == 0 {
            violations.push(Violation {
                path: "grocy.response_size_limit".to_string(),
                message: "size limit must be greater than zero".to_string(),
            });
        }
    }
}

/// Parse a boolean env value. Accepts true/false/1/0, case-insensitive.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_file() {
        let config = Config::resolve(None, &EnvOverrides::default()).unwrap();
        assert_eq!(config.grocy.base_url, "http://localhost:9283/api");
        assert!(config.grocy.verify_tls);
        assert!(!config.transport.enabled);
        assert!(config.tools.is_empty());
        assert_eq!(config.registry.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = Config::resolve(Some("  \n"), &EnvOverrides::default()).unwrap();
        assert_eq!(config.server.name, "grocy-mcp-server");
    }

    #[test]
    fn file_values_override_defaults() {
        let file = r#"{
            "transport": { "enabled": true, "port": 9000 },
            "grocy": { "base_url": "https://grocy.home/api", "verify_tls": false },
            "tools": {
                "stock_get_all": { "enabled": true },
                "purchase": { "enabled": true, "proof_token": "ALPHA_TOKEN", "default_location_id": 3 }
            }
        }"#;
        let config = Config::resolve(Some(file), &EnvOverrides::default()).unwrap();
        assert!(config.transport.enabled);
        assert_eq!(config.transport.port, 9000);
        assert_eq!(config.grocy.base_url, "https://grocy.home/api");
        assert!(!config.grocy.verify_tls);

        let purchase = &config.tools["purchase"];
        assert!(purchase.enabled);
        assert_eq!(purchase.proof_token.as_deref(), Some("ALPHA_TOKEN"));
        assert_eq!(purchase.extra["default_location_id"], 3);
    }

    #[test]
    fn env_beats_file() {
        let file = r#"{ "grocy": { "base_url": "http://from-file/api" } }"#;
        let env = EnvOverrides {
            base_url: Some("http://from-env/api".to_string()),
            verify_tls: Some("false".to_string()),
            transport_port: Some("1234".to_string()),
            ..Default::default()
        };
        let config = Config::resolve(Some(file), &env).unwrap();
        assert_eq!(config.grocy.base_url, "http://from-env/api");
        assert!(!config.grocy.verify_tls);
        assert_eq!(config.transport.port, 1234);
    }

    #[test]
    fn all_violations_reported_at_once() {
        let file = r#"{
            "transport": { "port": 0 },
            "grocy": { "base_url": "not a url", "response_size_limit": 0 }
        }"#;
        let err = Config::resolve(Some(file), &EnvOverrides::default()).unwrap_err();
        let paths: Vec<_> = err.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths.len(), 3);
        assert!(paths.contains(&"transport.port"));
        assert!(paths.contains(&"grocy.base_url"));
        assert!(paths.contains(&"grocy.response_size_limit"));
    }

    #[test]
    fn bad_env_value_is_a_violation_on_the_target_field() {
        let env = EnvOverrides {
            verify_tls: Some("maybe".to_string()),
            ..Default::default()
        };
        let err = Config::resolve(None, &env).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].path, "grocy.verify_tls");
    }

    #[test]
    fn non_http_scheme_rejected() {
        let file = r#"{ "grocy": { "base_url": "ftp://grocy.home/api" } }"#;
        let err = Config::resolve(Some(file), &EnvOverrides::default()).unwrap_err();
        assert_eq!(err.violations()[0].path, "grocy.base_url");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = Config::resolve(Some("{ not json"), &EnvOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_tool_names_are_accepted() {
        // Forward-compatible: unknown names only matter at enablement time.
        let file = r#"{ "tools": { "tool_from_the_future": { "enabled": false, "weird": 1 } } }"#;
        let config = Config::resolve(Some(file), &EnvOverrides::default()).unwrap();
        assert!(config.tools.contains_key("tool_from_the_future"));
    }

    #[test]
    fn duplicate_policy_parses_from_file() {
        let file = r#"{ "registry": { "duplicate_policy": "overwrite" } }"#;
        let config = Config::resolve(Some(file), &EnvOverrides::default()).unwrap();
        assert_eq!(config.registry.duplicate_policy, DuplicatePolicy::Overwrite);
    }

    #[test]
    fn api_key_redacted_in_debug() {
        let grocy = GrocyConfig {
            api_key: Some("super_secret_key".to_string()),
            ..Default::default()
        };
        let debug_str = format!("{grocy:?}");
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("no-such-config.json");
        let config = Config::load(&path, &EnvOverrides::default()).unwrap();
        assert_eq!(config.server.name, "grocy-mcp-server");
    }

    #[test]
    fn load_reads_file_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("grocy-mcp.json");
        std::fs::write(&path, r#"{ "server": { "name": "pantry" } }"#).unwrap();
        let config = Config::load(&path, &EnvOverrides::default()).unwrap();
        assert_eq!(config.server.name, "pantry");
    }
}
