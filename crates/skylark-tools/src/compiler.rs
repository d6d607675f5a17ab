use std::path::Path;

/// Builds a tool's source directory into an executable binary.
///
/// The tool manager is deliberately agnostic to the language toolchain used
/// by any given tool; a conforming implementation picks the toolchain (Go,
/// Rust, a shell script, whatever the tool's source directory contains) and
/// reports compiler stderr on failure.
#[async_trait::async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(
        &self,
        name: &str,
        source_dir: &Path,
        binary_path: &Path,
    ) -> Result<(), String>;
}

/// Default compiler: runs an executable named `build` inside `source_dir`,
/// passing the desired binary output path as its sole argument.
#[derive(Debug, Clone, Default)]
pub struct ScriptCompiler;

#[async_trait::async_trait]
impl Compiler for ScriptCompiler {
    async fn compile(
        &self,
        _name: &str,
        source_dir: &Path,
        binary_path: &Path,
    ) -> Result<(), String> {
        let build_script = source_dir.join("build");
        let output = tokio::process::Command::new(&build_script)
            .arg(binary_path)
            .current_dir(source_dir)
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {e}", build_script.display()))?;

        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).into_owned());
        }
        Ok(())
    }
}
