//! Post-install verification of the primary target.
//!
//! Two checks run after every target is installed: the primary target's
//! unit-test binary with a fixed parameter set, then an invocation of the
//! installed CLI. The CLI's output is never inspected; it legitimately prints
//! nothing on success, so only its exit code matters.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::OrchestratorError;
use crate::execute::{CommandLine, ExecuteError, Runner};
use crate::manifest::VerifyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Check {
  UnitTests,
  Smoke,
}

impl Check {
  pub fn as_str(self) -> &'static str {
    match self {
      Check::UnitTests => "unit-tests",
      Check::Smoke => "smoke",
    }
  }

  fn failure(self, target: &str, source: ExecuteError) -> OrchestratorError {
    let target = target.to_string();
    match self {
      Check::UnitTests => OrchestratorError::TestFailed { target, source },
      Check::Smoke => OrchestratorError::SmokeTestFailed { target, source },
    }
  }
}

impl fmt::Display for Check {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyStep {
  pub check: Check,
  pub command: CommandLine,
}

/// The verification commands for a primary target checked out at `checkout`.
pub fn checks(config: &VerifyConfig, checkout: &Path) -> Vec<VerifyStep> {
  let mut steps = Vec::with_capacity(2);

  if let Some(binary) = &config.test_binary {
    let program = checkout.join(binary);
    steps.push(VerifyStep {
      check: Check::UnitTests,
      command: CommandLine::new(program.to_string_lossy())
        .args(config.test_args.iter().cloned())
        .current_dir(checkout),
    });
  }

  if let Some(smoke) = CommandLine::from_argv(&config.smoke) {
    steps.push(VerifyStep {
      check: Check::Smoke,
      command: smoke,
    });
  }

  steps
}

/// Run the verification checks, failing on the first non-zero exit.
pub async fn verify<R: Runner>(
  runner: &R,
  config: &VerifyConfig,
  target: &str,
  checkout: &Path,
) -> Result<(), OrchestratorError> {
  let steps = checks(config, checkout);
  if steps.is_empty() {
    debug!(target = %target, "no verification configured");
    return Ok(());
  }

  for VerifyStep { check, command } in steps {
    info!(target = %target, check = %check, "running check");
    runner
      .run(&command)
      .await
      .map_err(|source| check.failure(target, source))?;
  }

  info!(target = %target, "verification passed");
  Ok(())
}
