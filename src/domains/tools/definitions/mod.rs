//! Tool definitions grouped by Grocy feature area.
//!
//! Each submodule exposes a `module()` loader that assembles its
//! [`ModuleBundle`](crate::domains::tools::ModuleBundle): tool metadata,
//! handlers, and any option validators the area registers.

pub mod common;
pub mod household;
pub mod inventory;
pub mod recipes;
pub mod shopping;
pub mod system;
