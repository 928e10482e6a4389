//! Run-level error taxonomy.
//!
//! Every failure is fatal: the first error aborts the run. Step failures keep
//! the underlying [`ExecuteError`] so the failing tool's exit code becomes the
//! orchestrator's own exit code.

use thiserror::Error;

use crate::clean::CleanError;
use crate::execute::ExecuteError;
use crate::fetch::FetchError;
use crate::workspace::WorkspaceError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
  #[error("cleanup failed: {0}")]
  CleanupFailed(#[from] CleanError),

  #[error(transparent)]
  Workspace(#[from] WorkspaceError),

  #[error("fetch failed for {target}: {source}")]
  FetchFailed {
    target: String,
    #[source]
    source: FetchError,
  },

  #[error("bootstrap failed for {target}: {source}")]
  BootstrapFailed {
    target: String,
    #[source]
    source: ExecuteError,
  },

  #[error("configure failed for {target}: {source}")]
  ConfigureFailed {
    target: String,
    #[source]
    source: ExecuteError,
  },

  #[error("compile failed for {target}: {source}")]
  CompileFailed {
    target: String,
    #[source]
    source: ExecuteError,
  },

  #[error("install failed for {target}: {source}")]
  InstallFailed {
    target: String,
    #[source]
    source: ExecuteError,
  },

  #[error("unit tests failed for {target}: {source}")]
  TestFailed {
    target: String,
    #[source]
    source: ExecuteError,
  },

  #[error("smoke test failed for {target}: {source}")]
  SmokeTestFailed {
    target: String,
    #[source]
    source: ExecuteError,
  },
}

impl OrchestratorError {
  /// Process exit status for this failure.
  ///
  /// The failing tool's own exit code when there is one, 1 otherwise.
  pub fn exit_code(&self) -> i32 {
    self
      .command_error()
      .and_then(ExecuteError::exit_code)
      .filter(|code| *code != 0)
      .unwrap_or(1)
  }

  /// The target the failure belongs to, for target-scoped failures.
  pub fn target(&self) -> Option<&str> {
    match self {
      OrchestratorError::FetchFailed { target, .. }
      | OrchestratorError::BootstrapFailed { target, .. }
      | OrchestratorError::ConfigureFailed { target, .. }
      | OrchestratorError::CompileFailed { target, .. }
      | OrchestratorError::InstallFailed { target, .. }
      | OrchestratorError::TestFailed { target, .. }
      | OrchestratorError::SmokeTestFailed { target, .. } => Some(target),
      OrchestratorError::CleanupFailed(_) | OrchestratorError::Workspace(_) => None,
    }
  }

  fn command_error(&self) -> Option<&ExecuteError> {
    match self {
      OrchestratorError::BootstrapFailed { source, .. }
      | OrchestratorError::ConfigureFailed { source, .. }
      | OrchestratorError::CompileFailed { source, .. }
      | OrchestratorError::InstallFailed { source, .. }
      | OrchestratorError::TestFailed { source, .. }
      | OrchestratorError::SmokeTestFailed { source, .. } => Some(source),
      OrchestratorError::CleanupFailed(CleanError::Elevated(source)) => Some(source),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn failed(code: Option<i32>) -> ExecuteError {
    ExecuteError::CmdFailed {
      cmd: "./configure".to_string(),
      code,
    }
  }

  #[test]
  fn step_failure_propagates_tool_exit_code() {
    let err = OrchestratorError::ConfigureFailed {
      target: "libzmq".to_string(),
      source: failed(Some(77)),
    };
    assert_eq!(err.exit_code(), 77);
    assert_eq!(err.target(), Some("libzmq"));
  }

  #[test]
  fn signal_termination_maps_to_one() {
    let err = OrchestratorError::CompileFailed {
      target: "libzmq".to_string(),
      source: failed(None),
    };
    assert_eq!(err.exit_code(), 1);
  }

  #[test]
  fn fetch_failure_maps_to_one() {
    let err = OrchestratorError::FetchFailed {
      target: "secp256k1".to_string(),
      source: FetchError::Interrupted("cancelled".to_string()),
    };
    assert_eq!(err.exit_code(), 1);
    assert_eq!(err.to_string(), "fetch failed for secp256k1: fetch task did not complete: cancelled");
  }

  #[test]
  fn elevated_cleanup_failure_keeps_code() {
    let err = OrchestratorError::CleanupFailed(CleanError::Elevated(failed(Some(5))));
    assert_eq!(err.exit_code(), 5);
    assert_eq!(err.target(), None);
  }
}
