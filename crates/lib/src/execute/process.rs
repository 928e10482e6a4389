//! Runner backed by real child processes.

use tokio::process::Command;
use tracing::{debug, info};

use super::{CommandLine, ExecuteError, Runner};

/// Spawns commands as child processes that inherit the orchestrator's
/// environment and stdio.
///
/// Output is not captured: the underlying tool's native diagnostics go
/// straight to the operator's terminal, and only the exit status is
/// inspected.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
  pub fn new() -> Self {
    Self
  }
}

impl Runner for ProcessRunner {
  async fn run(&self, command: &CommandLine) -> Result<(), ExecuteError> {
    info!(cmd = %command, "executing command");

    let mut process = Command::new(&command.program);
    process.args(&command.args);
    if let Some(dir) = command.working_dir() {
      process.current_dir(dir);
    }

    debug!(program = %command.program, working_dir = ?command.working_dir(), "spawning process");

    let status = process.status().await.map_err(|source| ExecuteError::Spawn {
      program: command.program.clone(),
      source,
    })?;

    if !status.success() {
      debug!(status = %status, "command exited unsuccessfully");
      return Err(ExecuteError::CmdFailed {
        cmd: command.to_string(),
        code: status.code(),
      });
    }

    Ok(())
  }
}
