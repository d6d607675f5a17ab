use std::path::PathBuf;

/// Errors surfaced by tool discovery, compilation, introspection, and
/// dispatch. Propagated unwrapped to the orchestrator so callers can
/// distinguish the failure kind.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("tool `{name}` has no source directory at {path}")]
    ToolNotFound { name: String, path: PathBuf },

    #[error("failed to compile tool `{name}`: {stderr}")]
    CompileError { name: String, stderr: String },

    #[error("tool `{name}` produced a malformed schema: {reason}")]
    SchemaError { name: String, reason: String },

    #[error("tool `{name}` reported unhealthy: {details}")]
    UnhealthyTool { name: String, details: String },

    #[error("invalid input for tool `{name}`: {reason}")]
    InvalidToolInput { name: String, reason: String },

    #[error(transparent)]
    ToolExecutionError(#[from] skylark_sandbox::SandboxError),

    #[error("I/O error while handling tool `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
