//! Run state machine and report.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use crate::error::OrchestratorError;

/// Where a run is.
///
/// `Idle → Cleaning → WorkspaceReady → (Fetching → Building)* → Verifying →
/// TornDown | Failed`. `TornDown` is the only clean terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
  Idle,
  Cleaning,
  WorkspaceReady,
  Fetching(String),
  Building(String),
  Verifying,
  TornDown,
  Failed,
}

impl RunState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, RunState::TornDown | RunState::Failed)
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunState::Idle => f.write_str("idle"),
      RunState::Cleaning => f.write_str("cleaning"),
      RunState::WorkspaceReady => f.write_str("workspace-ready"),
      RunState::Fetching(target) => write!(f, "fetching:{}", target),
      RunState::Building(target) => write!(f, "building:{}", target),
      RunState::Verifying => f.write_str("verifying"),
      RunState::TornDown => f.write_str("torn-down"),
      RunState::Failed => f.write_str("failed"),
    }
  }
}

/// Outcome of a run.
#[derive(Debug)]
pub struct RunReport {
  /// Every state the run entered, starting with `Idle`.
  pub states: Vec<RunState>,

  /// Targets whose pipeline completed, in build order.
  pub built: Vec<String>,

  /// Footprint paths removed by the cleaner.
  pub removed: Vec<PathBuf>,

  /// Workspace location (absolute once it has been created).
  pub workspace: PathBuf,

  /// Whether the workspace was removed at the end of the run.
  pub workspace_removed: bool,

  /// The failure that stopped the run, if any.
  pub failed: Option<OrchestratorError>,
}

impl RunReport {
  pub(crate) fn new(workspace: PathBuf) -> Self {
    Self {
      states: vec![RunState::Idle],
      built: Vec::new(),
      removed: Vec::new(),
      workspace,
      workspace_removed: false,
      failed: None,
    }
  }

  pub(crate) fn enter(&mut self, state: RunState) {
    debug_assert!(
      !self.state().is_terminal(),
      "run already ended in {}, cannot enter {}",
      self.state(),
      state
    );
    debug!(from = %self.state(), to = %state, "run state transition");
    self.states.push(state);
  }

  /// The current (or final) state.
  pub fn state(&self) -> &RunState {
    self.states.last().unwrap_or(&RunState::Idle)
  }

  pub fn is_success(&self) -> bool {
    self.failed.is_none() && *self.state() == RunState::TornDown
  }

  /// Process exit status: 0 on success, otherwise the failing step's code.
  pub fn exit_code(&self) -> i32 {
    self.failed.as_ref().map_or(0, OrchestratorError::exit_code)
  }
}
