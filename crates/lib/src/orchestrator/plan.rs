//! Dry-run planning.
//!
//! A plan lists every action a run would take, with fully resolved command
//! lines, without touching the filesystem or spawning anything.

use std::fmt;

use serde::Serialize;

use crate::execute::CommandLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
  Clean,
  Workspace,
  Fetch,
  Build,
  Verify,
  Teardown,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Phase::Clean => "clean",
      Phase::Workspace => "workspace",
      Phase::Fetch => "fetch",
      Phase::Build => "build",
      Phase::Verify => "verify",
      Phase::Teardown => "teardown",
    };
    f.pad(s)
  }
}

/// One planned action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
  pub phase: Phase,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target: Option<String>,
  /// Human-readable description of the action.
  pub action: String,
  /// The exact command, for actions that spawn a process.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub command: Option<CommandLine>,
}

impl PlannedStep {
  pub(crate) fn describe(phase: Phase, target: Option<&str>, action: impl Into<String>) -> Self {
    Self {
      phase,
      target: target.map(str::to_string),
      action: action.into(),
      command: None,
    }
  }

  pub(crate) fn command(phase: Phase, target: Option<&str>, label: &str, command: CommandLine) -> Self {
    Self {
      phase,
      target: target.map(str::to_string),
      action: label.to_string(),
      command: Some(command),
    }
  }
}
