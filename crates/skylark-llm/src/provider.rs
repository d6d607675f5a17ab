use crate::error::ProviderError;
use crate::types::{ProviderResponse, SendOptions};

/// The provider contract consumed (not specified) by the orchestrator: a
/// single async completion call plus a shutdown hook. Concrete HTTP clients
/// for specific vendors are out of scope; this trait is the seam they'd
/// implement against.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Provider name, e.g. `"openai"`, used for error attribution.
    fn name(&self) -> &str;

    async fn send(&self, prompt: &str, options: &SendOptions) -> Result<ProviderResponse, ProviderError>;

    /// Release any held resources (connections, sessions). Default no-op.
    async fn close(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
