//! Tool lifecycle manager: discovery, compilation, schema/health
//! introspection, caching, and validated dispatch through `skylark-sandbox`.
//!
//! Mirrors the layering of a terminal coding agent's tool registry: a
//! lock-guarded descriptor cache (see [`manager::ToolManager`]) sits above a
//! pluggable [`compiler::Compiler`], and execution is delegated to
//! `skylark_sandbox::Sandbox` rather than reimplemented here.

pub mod compiler;
pub mod dispatch;
pub mod error;
pub mod manager;
pub mod schema;

pub use compiler::{Compiler, ScriptCompiler};
pub use dispatch::{assemble_env, execute_tool, format_output, validate_input_bytes};
pub use error::ToolError;
pub use manager::ToolManager;
pub use schema::{EnvRequirement, HealthDocument, Tool, ToolSchema, UsageDocument, validate_input};
