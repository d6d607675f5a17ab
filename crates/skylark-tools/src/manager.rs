use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use crate::compiler::{Compiler, ScriptCompiler};
use crate::error::ToolError;
use crate::schema::{HealthDocument, Tool, UsageDocument};

/// Owns the cache of compiled, introspected [`Tool`] descriptors under
/// `<base>/tools/<name>/`. Shared across file-processing tasks; the cache is
/// guarded by a read-write lock so concurrent `LoadTool` calls for distinct
/// tools don't serialize on each other.
pub struct ToolManager {
    base_dir: PathBuf,
    compiler: Arc<dyn Compiler>,
    cache: RwLock<HashMap<String, Arc<Tool>>>,
}

impl ToolManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_compiler(base_dir, Arc::new(ScriptCompiler))
    }

    pub fn with_compiler(base_dir: impl Into<PathBuf>, compiler: Arc<dyn Compiler>) -> Self {
        Self {
            base_dir: base_dir.into(),
            compiler,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn source_dir(&self, name: &str) -> PathBuf {
        self.base_dir.join("tools").join(name)
    }

    fn binary_path(&self, name: &str) -> PathBuf {
        self.source_dir(name).join(name)
    }

    /// Load (compiling and introspecting on first use) the tool named
    /// `name`. Returns the same cached `Arc` on subsequent calls without
    /// recompiling or re-invoking `--usage`/`--health`.
    #[instrument(skip(self))]
    pub async fn load_tool(&self, name: &str) -> Result<Arc<Tool>, ToolError> {
        if let Some(tool) = self.cache.read().get(name) {
            return Ok(Arc::clone(tool));
        }

        let source_dir = self.source_dir(name);
        if !source_dir.exists() {
            return Err(ToolError::ToolNotFound {
                name: name.to_string(),
                path: source_dir,
            });
        }

        let binary_path = self.binary_path(name);
        self.compiler
            .compile(name, &source_dir, &binary_path)
            .await
            .map_err(|stderr| ToolError::CompileError {
                name: name.to_string(),
                stderr,
            })?;

        let tool = self.introspect(name, &binary_path).await?;
        let tool = Arc::new(tool);
        self.cache.write().insert(name.to_string(), Arc::clone(&tool));
        debug!(tool = name, "loaded and cached tool");
        Ok(tool)
    }

    async fn introspect(&self, name: &str, binary_path: &PathBuf) -> Result<Tool, ToolError> {
        let usage = run_json::<UsageDocument>(binary_path, "--usage")
            .await
            .map_err(|reason| ToolError::SchemaError {
                name: name.to_string(),
                reason,
            })?;

        let health = run_json::<HealthDocument>(binary_path, "--health")
            .await
            .map_err(|reason| ToolError::SchemaError {
                name: name.to_string(),
                reason,
            })?;

        if !health.status {
            return Err(ToolError::UnhealthyTool {
                name: name.to_string(),
                details: health.details,
            });
        }

        Ok(Tool {
            name: name.to_string(),
            binary_path: binary_path.clone(),
            schema: usage.schema,
            env_requirements: usage.env,
            last_built: SystemTime::now(),
        })
    }

    /// Rebuild the binary for `name` and bump its cached `last_built`
    /// timestamp. Does not re-run `--usage`/`--health` — the cached
    /// descriptor's schema is left untouched until an explicit [`Self::reload`].
    #[instrument(skip(self))]
    pub async fn compile(&self, name: &str) -> Result<(), ToolError> {
        let source_dir = self.source_dir(name);
        if !source_dir.exists() {
            return Err(ToolError::ToolNotFound {
                name: name.to_string(),
                path: source_dir,
            });
        }

        let binary_path = self.binary_path(name);
        self.compiler
            .compile(name, &source_dir, &binary_path)
            .await
            .map_err(|stderr| ToolError::CompileError {
                name: name.to_string(),
                stderr,
            })?;

        let mut cache = self.cache.write();
        if let Some(tool) = cache.get(name) {
            let mut updated = (**tool).clone();
            updated.last_built = SystemTime::now();
            cache.insert(name.to_string(), Arc::new(updated));
        }
        Ok(())
    }

    /// Force a fresh `LoadTool`, discarding any cached descriptor and
    /// re-running compile/usage/health from scratch.
    pub async fn reload(&self, name: &str) -> Result<Arc<Tool>, ToolError> {
        self.cache.write().remove(name);
        self.load_tool(name).await
    }

    /// Whether the on-disk binary's mtime is newer than the cached
    /// descriptor's `last_built` — a rebuild happened outside of
    /// [`Self::compile`]. Supplemental to the cache-stability contract: by
    /// itself this never invalidates the cache, callers decide whether to
    /// [`Self::reload`].
    pub fn is_stale(&self, name: &str) -> Result<bool, ToolError> {
        let Some(tool) = self.cache.read().get(name).cloned() else {
            return Ok(false);
        };
        let binary_path = self.binary_path(name);
        let metadata = std::fs::metadata(&binary_path).map_err(|source| ToolError::Io {
            name: name.to_string(),
            source,
        })?;
        let mtime = metadata.modified().map_err(|source| ToolError::Io {
            name: name.to_string(),
            source,
        })?;
        if mtime > tool.last_built {
            warn!(tool = name, "binary mtime moved past cached last_built");
        }
        Ok(mtime > tool.last_built)
    }

    pub fn cached(&self, name: &str) -> Option<Arc<Tool>> {
        self.cache.read().get(name).cloned()
    }
}

async fn run_json<T: serde::de::DeserializeOwned>(
    binary_path: &std::path::Path,
    flag: &str,
) -> Result<T, String> {
    let output = tokio::process::Command::new(binary_path)
        .arg(flag)
        .output()
        .await
        .map_err(|e| format!("failed to run `{} {flag}`: {e}", binary_path.display()))?;

    if !output.status.success() {
        return Err(format!(
            "`{} {flag}` exited with status {}",
            binary_path.display(),
            output.status
        ));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| format!("malformed JSON from `{} {flag}`: {e}", binary_path.display()))
}
