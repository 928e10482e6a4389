//! Execution context detection.
//!
//! Inside a continuous-integration job the primary target is already checked
//! out in the working directory and is built in place. The context is
//! decided once at the CLI boundary and handed to the orchestrator, which
//! never consults the environment itself.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Environment variables CI services set to `true` (or `1`).
const CI_MARKERS: &[&str] = &["CI", "TRAVIS", "GITHUB_ACTIONS", "GITLAB_CI", "BUILDKITE"];

/// Explicit override: `local` or `ci`.
pub const CONTEXT_OVERRIDE_VAR: &str = "SRCBUILD_CONTEXT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionContext {
  /// Every target, the primary included, is fetched into the workspace.
  Local,
  /// The primary target is built from `checkout` instead of being fetched.
  ContinuousIntegration { checkout: PathBuf },
}

impl ExecutionContext {
  /// Decide the context from the process environment.
  ///
  /// `cwd` becomes the primary checkout when a CI context is detected.
  pub fn detect(cwd: &Path) -> Self {
    if let Ok(value) = std::env::var(CONTEXT_OVERRIDE_VAR) {
      match value.to_ascii_lowercase().as_str() {
        "local" => return Self::Local,
        "ci" => return Self::ci(cwd),
        other => warn!(value = %other, "ignoring unrecognised {}", CONTEXT_OVERRIDE_VAR),
      }
    }

    match CI_MARKERS
      .iter()
      .find(|var| std::env::var(var).is_ok_and(|v| is_truthy(&v)))
    {
      Some(var) => {
        debug!(marker = %var, "continuous-integration context detected");
        Self::ci(cwd)
      }
      None => Self::Local,
    }
  }

  fn ci(cwd: &Path) -> Self {
    Self::ContinuousIntegration {
      checkout: cwd.to_path_buf(),
    }
  }

  pub fn is_ci(&self) -> bool {
    matches!(self, Self::ContinuousIntegration { .. })
  }

  /// The in-place checkout of the primary target, if any.
  pub fn ci_checkout(&self) -> Option<&Path> {
    match self {
      Self::ContinuousIntegration { checkout } => Some(checkout),
      Self::Local => None,
    }
  }
}

fn is_truthy(value: &str) -> bool {
  value.eq_ignore_ascii_case("true") || value == "1"
}
