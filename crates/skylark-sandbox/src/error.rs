use std::path::PathBuf;

/// Errors surfaced by [`crate::sandbox::Sandbox`].
///
/// Corresponds to the `ToolExecutionError` kind of the Skylark error model;
/// callers upstream (the tool manager) propagate this unwrapped so the
/// orchestrator can distinguish a sandbox failure from a schema or
/// compile failure.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("failed to create sandbox working directory {path}: {source}")]
    WorkDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create sandbox cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn sandboxed process `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sandboxed process `{program}` exceeded its CPU time limit and was terminated")]
    Timeout { program: String },

    #[error("sandboxed process `{program}` exited with status {code}")]
    NonZeroExit { program: String, code: i32 },

    #[error("sandboxed process `{program}` was terminated by signal {signal}")]
    Signaled { program: String, signal: i32 },

    #[error("sandbox cache I/O error: {0}")]
    Cache(#[source] std::io::Error),
}
