//! Implementation of a full build run.
//!
//! Cleans the install prefix, fetches and builds every target in order,
//! verifies the primary target and tears the workspace down according to
//! the cleanup policy. Subprocess output goes straight to the terminal.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use srcbuild_lib::execute::ProcessRunner;
use srcbuild_lib::fetch::GitFetcher;
use srcbuild_lib::orchestrator::{Orchestrator, RunReport};

use super::{Overrides, context_label, detect_context, load_manifest};
use crate::output::{print_error, print_info, print_stat, print_success};

/// Execute the run.
///
/// Returns the process exit code: 0 on success, otherwise the exit code of
/// the first failing step.
pub fn cmd_run(file: &Path, overrides: &Overrides, configure_args: Vec<String>) -> Result<i32> {
  let manifest = load_manifest(file, overrides)?;
  let context = detect_context()?;
  info!(file = %file.display(), context = context_label(&context), "loaded build file");

  let runner = ProcessRunner::new();
  let fetcher = GitFetcher::new();
  let orchestrator = Orchestrator::new(&manifest, context, &runner, &fetcher).with_extra_options(configure_args);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt.block_on(orchestrator.run());

  print_summary(&report);
  Ok(report.exit_code())
}

fn print_summary(report: &RunReport) {
  println!();
  match &report.failed {
    None => print_success(&format!("Built {} target(s)", report.built.len())),
    Some(err) => {
      print_error(&format!("Build failed: {}", err));
      if let Some(target) = err.target() {
        print_stat("Failed target", target);
      }
    }
  }

  if !report.built.is_empty() {
    print_stat("Installed", &report.built.join(", "));
  }
  print_stat("Removed from prefix", &report.removed.len().to_string());

  if report.workspace_removed {
    print_stat("Workspace", "removed");
  } else {
    print_info(&format!("Workspace kept at {}", report.workspace.display()));
  }
}
