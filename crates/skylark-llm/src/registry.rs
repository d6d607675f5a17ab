use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ProviderError;
use crate::model_spec::parse_model_spec;
use crate::provider::Provider;

/// Builds a `Provider` instance for a given model name.
pub type ProviderFactory = Arc<dyn Fn(&str) -> Result<Arc<dyn Provider>, ProviderError> + Send + Sync>;

/// Maps `"provider:model"` specs to provider instances.
///
/// The factory map is guarded by an `RwLock` so registration and resolution
/// can proceed concurrently across file-processing tasks, matching the
/// shared-mutable-state contract for the tool/assistant caches.
pub struct ProviderRegistry {
    default_provider: String,
    factories: RwLock<HashMap<String, ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            default_provider: default_provider.into(),
            factories: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, name: impl Into<String>, factory: ProviderFactory) {
        self.factories.write().insert(name.into(), factory);
    }

    /// Resolve `spec` (a `"provider:model"` string) to a provider instance
    /// and the bare model name the caller should pass to `send`.
    pub fn resolve(&self, spec: &str) -> Result<(Arc<dyn Provider>, String), ProviderError> {
        let (provider_name, model) = parse_model_spec(spec);
        let provider_name = if provider_name.is_empty() {
            self.default_provider.clone()
        } else {
            provider_name
        };

        let factories = self.factories.read();
        let factory = factories
            .get(&provider_name)
            .ok_or_else(|| ProviderError::UnknownProvider(provider_name.clone()))?;
        let provider = factory(&model)?;
        Ok((provider, model))
    }
}
