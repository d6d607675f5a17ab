//! Process-group helpers for reliable sandboxed child cleanup.
//!
//! - [`set_process_group`] runs in `pre_exec` so the child becomes its own
//!   process group leader, so killing the group doesn't touch the sandbox
//!   host process.
//! - [`kill_process_group_by_pid`] resolves the PGID for a PID and signals
//!   the whole group, which is what lets the CPU-time timer and the
//!   post-run cleanup reach grandchildren a tool binary may have spawned.
//! - [`graceful_kill_process_group`] sends SIGTERM, waits a grace period,
//!   then SIGKILL if the group is still alive; used for ordinary
//!   cancellation. The CPU-time limiter instead calls
//!   [`kill_process_group_by_pid`] directly with `KillSignal::Kill` since a
//!   timed-out tool gets no grace period.

use std::io;
use std::time::Duration;

/// Default grace period for graceful termination.
pub const DEFAULT_GRACEFUL_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KillSignal {
    Term,
    #[default]
    Kill,
}

#[cfg(unix)]
impl KillSignal {
    fn as_libc_signal(self) -> libc::c_int {
        match self {
            KillSignal::Term => libc::SIGTERM,
            KillSignal::Kill => libc::SIGKILL,
        }
    }
}

/// Put the calling process into its own process group.
///
/// Intended for use in `pre_exec` so the spawned tool becomes the group
/// leader and can be torn down as a unit, including any subprocesses it
/// spawns.
#[cfg(unix)]
pub(crate) fn set_process_group() -> io::Result<()> {
    let result = unsafe { libc::setpgid(0, 0) };
    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(not(unix))]
pub(crate) fn set_process_group() -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    let result = unsafe { libc::kill(pid as libc::pid_t, 0) };
    result == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    true
}

/// Kill the process group rooted at `pid` with the given signal (best-effort).
#[cfg(unix)]
pub fn kill_process_group_by_pid(pid: u32, signal: KillSignal) -> io::Result<()> {
    use std::io::ErrorKind;

    let pgid = unsafe { libc::getpgid(pid as libc::pid_t) };
    if pgid == -1 {
        let err = io::Error::last_os_error();
        return if err.kind() == ErrorKind::NotFound {
            Ok(())
        } else {
            Err(err)
        };
    }

    let result = unsafe { libc::killpg(pgid, signal.as_libc_signal()) };
    if result == -1 {
        let err = io::Error::last_os_error();
        if err.kind() != ErrorKind::NotFound {
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn kill_process_group_by_pid(_pid: u32, _signal: KillSignal) -> io::Result<()> {
    Ok(())
}

/// Result of a graceful termination attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GracefulTerminationResult {
    GracefulExit,
    ForcefulKill,
    AlreadyExited,
    Error,
}

/// Send SIGTERM, wait up to `grace_period`, then SIGKILL if still alive.
#[cfg(unix)]
pub fn graceful_kill_process_group(pid: u32, grace_period: Duration) -> GracefulTerminationResult {
    if !is_process_running(pid) {
        return GracefulTerminationResult::AlreadyExited;
    }

    let pgid = unsafe { libc::getpgid(pid as libc::pid_t) };
    if pgid == -1 {
        return GracefulTerminationResult::AlreadyExited;
    }

    if unsafe { libc::killpg(pgid, libc::SIGTERM) } == -1 {
        let err = io::Error::last_os_error();
        return if err.raw_os_error() == Some(libc::ESRCH) {
            GracefulTerminationResult::AlreadyExited
        } else {
            GracefulTerminationResult::Error
        };
    }

    let deadline = std::time::Instant::now() + grace_period;
    let poll_interval = Duration::from_millis(10);
    while std::time::Instant::now() < deadline {
        if !is_process_running(pid) {
            return GracefulTerminationResult::GracefulExit;
        }
        std::thread::sleep(poll_interval);
    }

    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            return GracefulTerminationResult::GracefulExit;
        }
        return GracefulTerminationResult::Error;
    }
    GracefulTerminationResult::ForcefulKill
}

#[cfg(not(unix))]
pub fn graceful_kill_process_group(
    _pid: u32,
    _grace_period: Duration,
) -> GracefulTerminationResult {
    GracefulTerminationResult::Error
}
