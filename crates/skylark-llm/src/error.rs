/// Transport or response-level failure from a provider `Send`.
///
/// Corresponds to spec's `ProviderError` kind: the orchestrator wraps any
/// provider transport failure or a non-nil `response.error` in this type
/// before surfacing it as fatal for the command.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown provider `{0}`")]
    UnknownProvider(String),

    #[error("transport error calling provider `{provider}`: {message}")]
    Transport { provider: String, message: String },

    #[error("provider `{provider}` returned an error: {message}")]
    Response { provider: String, message: String },
}
