//! Error types for process execution.

use thiserror::Error;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The program could not be started at all (missing binary, permissions).
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The command ran and exited unsuccessfully.
  ///
  /// `code` is `None` when the process was terminated by a signal.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },
}

impl ExecuteError {
  /// The exit code reported by the failed process, if it produced one.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      ExecuteError::CmdFailed { code, .. } => *code,
      ExecuteError::Spawn { .. } => None,
    }
  }
}
