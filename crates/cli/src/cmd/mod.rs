mod plan;
mod run;

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use srcbuild_lib::context::ExecutionContext;
use srcbuild_lib::manifest::{CleanupPolicy, Manifest};

pub use plan::cmd_plan;
pub use run::cmd_run;

/// Command-line settings that take precedence over the build file.
#[derive(Debug, Default)]
pub struct Overrides {
  pub jobs: Option<NonZeroUsize>,
  pub cleanup: Option<CleanupPolicy>,
  pub workspace: Option<PathBuf>,
}

/// Load and validate the build file, then apply `overrides`.
fn load_manifest(file: &Path, overrides: &Overrides) -> Result<Manifest> {
  let mut manifest =
    Manifest::from_file(file).with_context(|| format!("Failed to load build file: {}", file.display()))?;

  if let Some(jobs) = overrides.jobs {
    manifest.settings.jobs = jobs.get();
  }
  if let Some(cleanup) = overrides.cleanup {
    manifest.settings.cleanup = cleanup;
  }
  if let Some(workspace) = &overrides.workspace {
    manifest.settings.workspace = workspace.clone();
  }

  Ok(manifest)
}

fn detect_context() -> Result<ExecutionContext> {
  let cwd = std::env::current_dir().context("Failed to determine current directory")?;
  Ok(ExecutionContext::detect(&cwd))
}

fn context_label(context: &ExecutionContext) -> &'static str {
  if context.is_ci() { "ci" } else { "local" }
}
