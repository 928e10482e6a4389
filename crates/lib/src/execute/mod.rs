//! External process execution.
//!
//! Every tool srcbuild drives (configure scripts, make, ldconfig, test
//! binaries, elevated removals) is spawned through the [`Runner`] trait so
//! the orchestrator can be exercised without touching the system.

pub mod command;
pub mod process;
pub mod types;

pub use command::CommandLine;
pub use process::ProcessRunner;
pub use types::ExecuteError;

/// Runs a single external command to completion.
///
/// Implementations block the caller until the process exits and map any
/// non-zero exit status to [`ExecuteError::CmdFailed`]. Steps are strictly
/// sequential, so implementations are not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait Runner {
  async fn run(&self, command: &CommandLine) -> Result<(), ExecuteError>;
}

