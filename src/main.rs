//! MCP Server Entry Point
//!
//! This is the main entry point for the Grocy MCP server. It initializes
//! logging, resolves configuration, builds the tool catalog, and starts the
//! server with the configured transport.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

use grocy_mcp_server::core::config::DEFAULT_CONFIG_PATH;
use grocy_mcp_server::core::{Config, ConfigError, EnvOverrides, GrocyClient, McpServer, TransportService};
use grocy_mcp_server::domains::tools::{Enablement, ModuleDiscovery, ToolCatalog, ToolRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present, so GROCY_API_KEY etc. can live alongside the
    // config file during development.
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded environment from {}", path.display());
    }

    let env = EnvOverrides::from_process();
    let config_path =
        std::env::var("GROCY_MCP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = match Config::load(Path::new(&config_path), &env) {
        Ok(config) => config,
        Err(err) => {
            // Logging is initialized after config resolution; fall back to a
            // default subscriber so the failure is still reported.
            init_logging("info");
            report_config_error(&config_path, &err);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);

    // Discover tool modules and build the registry.
    let discovery = ModuleDiscovery::builtin();
    let registry = match ToolRegistry::from_modules(discovery.discover(), config.registry.duplicate_policy) {
        Ok(registry) => registry,
        Err(err) => {
            error!("Tool registry build failed: {err}");
            std::process::exit(1);
        }
    };
    info!(tools = registry.len(), "Tool registry built");

    // Resolve the enabled set against the registry, running option
    // validators up front so bad config fails at startup rather than on
    // first call.
    let enablement = match Enablement::resolve(&config.tools, &registry) {
        Ok(enablement) => enablement,
        Err(err) => {
            error!("Tool enablement failed: {err}");
            std::process::exit(1);
        }
    };
    info!(enabled = enablement.len(), "Tool enablement resolved");

    let client = match GrocyClient::new(&config.grocy) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!("Grocy client setup failed: {err}");
            std::process::exit(1);
        }
    };

    let catalog = Arc::new(ToolCatalog::new(registry, enablement, client));
    let config = Arc::new(config);
    let server = McpServer::new(config.clone(), catalog);

    info!("Server initialized");

    let transport = TransportService::from_section(&config.transport);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Report a configuration failure, one line per violation.
fn report_config_error(path: &str, err: &ConfigError) {
    let violations = err.violations();
    if violations.is_empty() {
        error!("Configuration error ({path}): {err}");
    } else {
        error!(
            "Configuration invalid ({path}): {} violation(s)",
            violations.len()
        );
        for violation in violations {
            error!("  {violation}");
        }
    }
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level, writing to stderr so
/// stdout stays reserved for the MCP protocol.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
