/// Error kinds surfaced by the parser, orchestrator, and rewriter.
///
/// Tool errors are propagated unwrapped (via [`skylark_tools::ToolError`])
/// so callers can distinguish a sandbox/schema failure from a parser or
/// provider failure, per the propagation rule in spec §7.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("invalid assistant definition: {reason}")]
    InvalidAssistant { reason: String },

    #[error("assembled context exceeds size limits: {reason}")]
    ContextOverflow { reason: String },

    #[error("rewriter could not locate command: {command}")]
    CommandNotFound { command: String },

    #[error(transparent)]
    Tool(#[from] skylark_tools::ToolError),

    #[error("provider error: {0}")]
    Provider(#[from] skylark_llm::ProviderError),
}
