use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use crate::cache::ResultCache;
use crate::error::SandboxError;
use crate::limits::{ResourceLimits, ResourceUsage, apply_rlimits};
use crate::network::NetworkPolicy;
use crate::process_group;

/// Environment variables always whitelisted once any whitelist is set.
const ALWAYS_WHITELISTED: [&str; 4] = ["PATH", "HOME", "USER", "SHELL"];

/// One sandbox instance is created per tool root and reused across
/// executions of that tool.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub work_dir: PathBuf,
    pub limits: ResourceLimits,
    pub network: NetworkPolicy,
    pub env_whitelist: Vec<String>,
    pub allowed_paths: Vec<PathBuf>,
    pub cache_enabled: bool,
    pub cache_dir: PathBuf,
    pub tool_version: Option<String>,
}

impl SandboxConfig {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let cache_dir = work_dir.join(".cache");
        Self {
            work_dir,
            limits: ResourceLimits::default(),
            network: NetworkPolicy::deny_all(),
            env_whitelist: Vec::new(),
            allowed_paths: Vec::new(),
            cache_enabled: true,
            cache_dir,
            tool_version: None,
        }
    }
}

/// A process to run under the sandbox's policy.
#[derive(Debug, Clone)]
pub struct ChildSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Caller-assembled environment overrides (e.g. from the tool manager's
    /// env-requirement resolution). Merged over the whitelist-filtered host
    /// environment; see [`Sandbox::execute`].
    pub env: HashMap<String, String>,
    pub stdin: Vec<u8>,
}

impl ChildSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            stdin: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    NonZero(i32),
    Signaled(i32),
}

#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    pub stdout: Vec<u8>,
    pub outcome: ExitOutcome,
    pub usage: ResourceUsage,
}

/// Process isolation sandbox: resource limits, process-group cleanup,
/// env/network policy, and a TTL result cache, one per tool root.
pub struct Sandbox {
    config: SandboxConfig,
    cache: ResultCache,
}

impl Sandbox {
    /// Create the sandbox, ensuring `work_dir` and the cache subdirectory
    /// exist as required by the invariant that the working directory must
    /// be created before any execution.
    pub fn new(config: SandboxConfig) -> Result<Self, SandboxError> {
        std::fs::create_dir_all(&config.work_dir).map_err(|source| SandboxError::WorkDir {
            path: config.work_dir.clone(),
            source,
        })?;
        std::fs::create_dir_all(&config.cache_dir).map_err(|source| SandboxError::CacheDir {
            path: config.cache_dir.clone(),
            source,
        })?;

        let cache = ResultCache::new(config.cache_dir.clone(), config.cache_enabled);
        Ok(Self { config, cache })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    fn resolved_env(&self, spec_env: &HashMap<String, String>) -> HashMap<String, String> {
        let host: HashMap<String, String> = std::env::vars().collect();

        if self.config.env_whitelist.is_empty() {
            let mut env = host;
            env.extend(spec_env.clone());
            return env;
        }

        let allowed: HashSet<&str> = self
            .config
            .env_whitelist
            .iter()
            .map(String::as_str)
            .chain(ALWAYS_WHITELISTED)
            .collect();

        let mut env: HashMap<String, String> = host
            .into_iter()
            .filter(|(k, _)| allowed.contains(k.as_str()))
            .collect();
        for (k, v) in spec_env {
            if allowed.contains(k.as_str()) {
                env.insert(k.clone(), v.clone());
            }
        }
        env
    }

    /// Run `spec` under the sandbox's policy.
    ///
    /// Implements the contract of spec.md §4.4: pin cwd, new process group,
    /// env whitelist, CPU-time timer that signals the whole group on fire,
    /// rlimit caps applied in the child via `pre_exec`, and translation of
    /// non-zero exit / signal termination into [`SandboxError`].
    pub async fn execute(&self, spec: &ChildSpec) -> Result<ExecutionOutput, SandboxError> {
        let env = self.resolved_env(&spec.env);
        let limits = self.config.limits;

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&self.config.work_dir)
            .env_clear()
            .envs(&env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        unsafe {
            command.pre_exec(move || {
                process_group::set_process_group()?;
                apply_rlimits(&limits)?;
                Ok(())
            });
        }

        let started = Instant::now();
        let mut child = command
            .spawn()
            .map_err(|source| SandboxError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let pid = child.id();

        if let Some(mut stdin) = child.stdin.take() {
            let input = spec.stdin.clone();
            tokio::spawn(async move {
                let _ = stdin.write_all(&input).await;
                let _ = stdin.shutdown().await;
            });
        }

        let mut stdout_buf = Vec::new();
        let stdout_task = child.stdout.take().map(|stdout| {
            tokio::spawn(async move {
                let mut reader = BufReader::new(stdout);
                let mut buf = Vec::new();
                let _ = reader.read_to_end(&mut buf).await;
                buf
            })
        });

        // Drain stderr concurrently so a chatty tool can't deadlock on pipe
        // backpressure while we wait on stdout/exit.
        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr);
                let mut buf = Vec::new();
                let _ = reader.read_to_end(&mut buf).await;
            })
        });

        let timed_out = tokio::time::timeout(limits.max_cpu_time, child.wait()).await;

        let wall_time = started.elapsed();

        let status = match timed_out {
            Ok(status) => status.map_err(|source| SandboxError::Spawn {
                program: spec.program.clone(),
                source,
            })?,
            Err(_elapsed) => {
                if let Some(pid) = pid {
                    let _ = process_group::kill_process_group_by_pid(
                        pid,
                        process_group::KillSignal::Kill,
                    );
                }
                let _ = child.wait().await;
                return Err(SandboxError::Timeout {
                    program: spec.program.clone(),
                });
            }
        };

        if let Some(task) = stdout_task {
            stdout_buf = task.await.unwrap_or_default();
        }
        if let Some(task) = stderr_task {
            let _ = task.await;
        }

        let usage = ResourceUsage {
            wall_time,
            peak_rss_bytes: None,
        };

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Err(SandboxError::Signaled {
                    program: spec.program.clone(),
                    signal,
                });
            }
        }

        match status.code() {
            Some(0) => Ok(ExecutionOutput {
                stdout: stdout_buf,
                outcome: ExitOutcome::Success,
                usage,
            }),
            Some(code) => Err(SandboxError::NonZeroExit {
                program: spec.program.clone(),
                code,
            }),
            None => Err(SandboxError::NonZeroExit {
                program: spec.program.clone(),
                code: -1,
            }),
        }
    }

    /// Remove files directly under `work_dir` whose base name begins with
    /// `tmp.` (non-recursive).
    pub fn cleanup(&self) -> std::io::Result<()> {
        for entry in std::fs::read_dir(&self.config.work_dir)?.flatten() {
            let path = entry.path();
            if path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("tmp."))
            {
                let _ = std::fs::remove_file(path);
            }
        }
        Ok(())
    }
}

/// Parse `current`/`min` as dotted `x.y.z` triplets and report whether
/// `current >= min`. Empty on either side is treated as satisfied.
pub fn verify_tool_version(current: &str, min: &str) -> bool {
    if current.is_empty() || min.is_empty() {
        return true;
    }

    fn parse(v: &str) -> Option<(u64, u64, u64)> {
        let mut parts = v.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().unwrap_or("0").parse().ok()?;
        let patch = parts.next().unwrap_or("0").parse().ok()?;
        Some((major, minor, patch))
    }

    match (parse(current), parse(min)) {
        (Some(c), Some(m)) => c >= m,
        _ => true,
    }
}
