//! Process isolation sandbox used by Skylark's tool lifecycle manager.
//!
//! Modeled after a terminal agent's bash-runner crate: a process-group aware
//! child executor with cross-platform cleanup, layered on top of a
//! resource-limit / network-policy configuration and a simple TTL result
//! cache.
//!
//! ## Modules
//!
//! - [`limits`] - resource limit configuration and rlimit application
//! - [`network`] - network access policy (carried for downstream enforcement)
//! - [`process_group`] - cross-platform process-group spawn/kill helpers
//! - [`cache`] - TTL-bounded result cache keyed by opaque byte key
//! - [`sandbox`] - the `Sandbox` type: execute, cleanup, cache, version check

pub mod cache;
pub mod error;
pub mod limits;
pub mod network;
pub mod process_group;
pub mod sandbox;

pub use cache::ResultCache;
pub use error::SandboxError;
pub use limits::ResourceLimits;
pub use network::NetworkPolicy;
pub use sandbox::{ChildSpec, ExecutionOutput, ExitOutcome, Sandbox, SandboxConfig};
