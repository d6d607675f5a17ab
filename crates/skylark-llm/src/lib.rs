//! Provider contract consumed by the assistant orchestrator.
//!
//! This crate specifies the seam, not any concrete vendor client: a minimal
//! async `Provider` trait (`send`/`close`), the response/usage/tool-call
//! shapes, `"provider:model"` spec parsing, and a lock-guarded registry that
//! resolves specs to provider instances. Modeled after a terminal coding
//! agent's LLM provider-trait/factory layering, trimmed to the contract the
//! orchestrator actually needs.

pub mod error;
pub mod model_spec;
pub mod provider;
pub mod registry;
pub mod types;

pub use error::ProviderError;
pub use model_spec::parse_model_spec;
pub use provider::Provider;
pub use registry::{ProviderFactory, ProviderRegistry};
pub use types::{ProviderResponse, SendOptions, ToolCall, Usage};
