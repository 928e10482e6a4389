//! Host platform queries.
//!
//! Everything the orchestrator needs to know about the machine it runs on:
//! the operating system, whether the process is already privileged, and how
//! many compile jobs the host can sustain.

pub mod os;

pub use os::Os;

/// Returns true when the current process already runs with root privileges.
///
/// Privileged steps are only wrapped in the configured elevation command when
/// this returns false.
#[cfg(unix)]
pub fn is_elevated() -> bool {
  rustix::process::geteuid().is_root()
}

#[cfg(not(unix))]
pub fn is_elevated() -> bool {
  false
}

/// Default compile parallelism, derived from the host's logical CPU count.
pub fn host_parallelism() -> usize {
  num_cpus::get().max(1)
}
