//! Built-in tools and the registry that dispatches them.

pub mod base;
pub mod filesystem;
pub mod registry;
pub mod search;
pub mod shell;

pub use base::{ParamKind, ParamSpec, Tool};
pub use registry::ToolRegistry;
