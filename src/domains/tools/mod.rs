//! Tools domain module.
//!
//! This is the operation registry and configuration-resolution subsystem:
//! everything between the resolved configuration and an executed tool call.
//!
//! ## Architecture
//!
//! - `definitions/` - tool implementations, one file per functional area
//! - `module.rs` - module bundles and startup discovery (with caching)
//! - `registry.rs` - the aggregated catalog keyed by unique tool name
//! - `enablement.rs` - config-to-registry cross-referencing
//! - `options.rs` - per-tool option maps and validators
//! - `annotate.rs` - proof-token annotation of successful results
//! - `dispatch.rs` - the facade consumed by the transport layer
//! - `error.rs` - tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Pick the functional area file in `definitions/` (or add one)
//! 2. Define params, `to_tool()`, and the `ToolHandler` impl
//! 3. Register it in that area's `module()` bundle
//! 4. New areas also need a loader entry in `ModuleDiscovery::builtin()`
//!
//! Everything downstream (registry, enablement, listing, dispatch) picks the
//! tool up from the bundle.

pub mod annotate;
pub mod definitions;
mod dispatch;
mod enablement;
mod error;
mod module;
mod options;
mod registry;

pub use dispatch::ToolCatalog;
pub use enablement::{Enablement, EnablementError};
pub use error::ToolError;
pub use module::{ModuleBundle, ModuleDiscovery, ModuleError, ModuleLoader, ToolHandler};
pub use options::{OptionsError, OptionsValidator, ToolOptions};
pub use registry::{RegistryError, ToolRegistry};
