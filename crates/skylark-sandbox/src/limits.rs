use std::time::Duration;

/// Resource caps applied to a sandboxed child process.
///
/// Defaults match the documented sandbox policy: 30s CPU time, 512MB
/// address space, 10MB max file size, 100 open files, 10 processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    pub max_cpu_time: Duration,
    pub max_memory_bytes: u64,
    pub max_file_size_bytes: u64,
    pub max_open_files: u64,
    pub max_processes: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_cpu_time: Duration::from_secs(30),
            max_memory_bytes: 512 * 1024 * 1024,
            max_file_size_bytes: 10 * 1024 * 1024,
            max_open_files: 100,
            max_processes: 10,
        }
    }
}

/// Snapshot of resource usage observed for a completed execution.
///
/// Supplements the documented limits with a lightweight accounting record,
/// analogous to an execution-tracker module: wall time is always known;
/// peak RSS is best-effort and `None` when the platform cannot report it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    pub wall_time: Duration,
    pub peak_rss_bytes: Option<u64>,
}

/// Apply `limits` as POSIX rlimits to the *calling* process.
///
/// Intended to run inside a `pre_exec` hook (i.e. after fork, before exec)
/// so the caps bind only the child. A failure here aborts the exec via the
/// `pre_exec` error path; it never silently skips a requested limit.
#[cfg(unix)]
pub(crate) fn apply_rlimits(limits: &ResourceLimits) -> std::io::Result<()> {
    set_rlimit(libc::RLIMIT_CPU, limits.max_cpu_time.as_secs().max(1))?;
    set_rlimit(libc::RLIMIT_AS, limits.max_memory_bytes)?;
    set_rlimit(libc::RLIMIT_FSIZE, limits.max_file_size_bytes)?;
    set_rlimit(libc::RLIMIT_NOFILE, limits.max_open_files)?;
    set_rlimit(libc::RLIMIT_NPROC, limits.max_processes)?;
    Ok(())
}

#[cfg(unix)]
fn set_rlimit(resource: libc::c_int, value: u64) -> std::io::Result<()> {
    let rlim = libc::rlimit {
        rlim_cur: value as libc::rlim_t,
        rlim_max: value as libc::rlim_t,
    };
    let ret = unsafe { libc::setrlimit(resource, &rlim) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn apply_rlimits(_limits: &ResourceLimits) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let limits = ResourceLimits::default();
        assert_eq!(limits.max_cpu_time, Duration::from_secs(30));
        assert_eq!(limits.max_memory_bytes, 512 * 1024 * 1024);
        assert_eq!(limits.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(limits.max_open_files, 100);
        assert_eq!(limits.max_processes, 10);
    }
}
