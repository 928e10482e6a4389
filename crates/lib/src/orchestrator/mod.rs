//! Run orchestration.
//!
//! The orchestrator drives one fail-fast run over a [`Manifest`]:
//!
//! 1. Clean: remove every target's install footprint from the prefix
//! 2. Create the workspace
//! 3. For each target, in declared order: fetch it, then build and install it
//! 4. Verify the primary target
//! 5. Tear down the workspace according to the cleanup policy
//!
//! Targets never overlap: each one may link against what the previous one
//! installed into the shared prefix, so the strict sequential order is what
//! keeps the prefix consistent. The first failure stops the run; nothing is
//! retried or skipped.

pub mod plan;
pub mod state;

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::build::{self, BuildPipeline};
use crate::clean;
use crate::context::ExecutionContext;
use crate::error::OrchestratorError;
use crate::execute::Runner;
use crate::fetch::{Fetcher, checkout_dir};
use crate::manifest::Manifest;
use crate::target::BuildTarget;
use crate::verify;
use crate::workspace;

pub use plan::{Phase, PlannedStep};
pub use state::{RunReport, RunState};

pub struct Orchestrator<'a, R, F> {
  manifest: &'a Manifest,
  context: ExecutionContext,
  runner: &'a R,
  fetcher: &'a F,
  extra_options: Vec<String>,
}

impl<'a, R: Runner, F: Fetcher> Orchestrator<'a, R, F> {
  pub fn new(manifest: &'a Manifest, context: ExecutionContext, runner: &'a R, fetcher: &'a F) -> Self {
    Self {
      manifest,
      context,
      runner,
      fetcher,
      extra_options: Vec::new(),
    }
  }

  /// Options appended verbatim to every target's configure line.
  pub fn with_extra_options(mut self, options: Vec<String>) -> Self {
    self.extra_options = options;
    self
  }

  /// Execute the run.
  ///
  /// Never returns early: the outcome, including the failure that stopped
  /// the run, is recorded in the returned [`RunReport`].
  pub async fn run(&self) -> RunReport {
    let settings = &self.manifest.settings;
    let mut report = RunReport::new(settings.workspace.clone());

    info!(
      targets = self.manifest.targets.len(),
      jobs = settings.jobs,
      ci = self.context.is_ci(),
      "starting run"
    );

    let result = self.drive(&mut report).await;
    let success = result.is_ok();

    if let Err(err) = result {
      error!(state = %report.state(), error = %err, "run failed");
      report.failed = Some(err);
    }

    // Only a workspace this run created is ever torn down.
    let created = report.states.contains(&RunState::WorkspaceReady);

    if created && settings.cleanup.removes_after(success) {
      match workspace::destroy(&report.workspace) {
        Ok(()) => report.workspace_removed = true,
        Err(err) if report.failed.is_none() => report.failed = Some(err.into()),
        Err(err) => warn!(error = %err, "failed to remove workspace after failed run"),
      }
    } else if created && !success {
      info!(path = %report.workspace.display(), "workspace left in place for inspection");
    }

    if report.failed.is_some() {
      report.enter(RunState::Failed);
    } else {
      report.enter(RunState::TornDown);
      info!(built = report.built.len(), "run complete");
    }

    report
  }

  async fn drive(&self, report: &mut RunReport) -> Result<(), OrchestratorError> {
    let settings = &self.manifest.settings;

    report.enter(RunState::Cleaning);
    report.removed = clean::clean(
      self.runner,
      &settings.prefix,
      self.manifest.targets.iter().map(|t| &t.footprint),
    )
    .await?;

    let protected: Vec<&Path> = self.context.ci_checkout().into_iter().collect();
    let state = workspace::create(&settings.workspace, &protected)?;
    report.workspace = state.root.clone();
    report.enter(RunState::WorkspaceReady);

    let pipeline = BuildPipeline::new(self.manifest, &self.extra_options);
    let mut primary_checkout = None;

    for target in &self.manifest.targets {
      report.enter(RunState::Fetching(target.name().to_string()));
      let checkout = self.checkout(target, &state.root).await?;

      report.enter(RunState::Building(target.name().to_string()));
      build::build(self.runner, &pipeline, target, &checkout).await?;
      report.built.push(target.name().to_string());

      if self.manifest.is_primary(target) {
        primary_checkout = Some(checkout);
      }
    }

    report.enter(RunState::Verifying);
    if let (Some(primary), Some(checkout)) = (self.manifest.primary_target(), primary_checkout) {
      verify::verify(self.runner, &self.manifest.verify, primary.name(), &checkout).await?;
    }

    let elapsed = state.created_at.elapsed().unwrap_or_default();
    info!(elapsed = ?elapsed, "all targets built and verified");
    Ok(())
  }

  async fn checkout(&self, target: &BuildTarget, workspace: &Path) -> Result<PathBuf, OrchestratorError> {
    if let Some(dir) = self.in_place_checkout(target) {
      info!(target = %target.name(), path = %dir.display(), "building primary target in place");
      return Ok(dir.to_path_buf());
    }

    self
      .fetcher
      .fetch(target, workspace)
      .await
      .map_err(|source| OrchestratorError::FetchFailed {
        target: target.name().to_string(),
        source,
      })
  }

  /// The CI checkout, when `target` is the primary and the run is in CI.
  fn in_place_checkout(&self, target: &BuildTarget) -> Option<&Path> {
    self
      .context
      .ci_checkout()
      .filter(|_| self.manifest.is_primary(target))
  }

  /// Describe everything [`run`](Self::run) would do, without doing it.
  pub fn plan(&self) -> Vec<PlannedStep> {
    let settings = &self.manifest.settings;
    let mut steps = Vec::new();

    for target in &self.manifest.targets {
      for pattern in target.footprint.patterns() {
        steps.push(PlannedStep::describe(
          Phase::Clean,
          Some(target.name()),
          format!("remove {}", settings.prefix.resolve(pattern).display()),
        ));
      }
    }

    steps.push(PlannedStep::describe(
      Phase::Workspace,
      None,
      format!("create {}", settings.workspace.display()),
    ));

    let pipeline = BuildPipeline::new(self.manifest, &self.extra_options);
    let mut primary_checkout = None;

    for target in &self.manifest.targets {
      let checkout = match self.in_place_checkout(target) {
        Some(dir) => {
          steps.push(PlannedStep::describe(
            Phase::Fetch,
            Some(target.name()),
            format!("use checkout {}", dir.display()),
          ));
          dir.to_path_buf()
        }
        None => {
          steps.push(PlannedStep::describe(
            Phase::Fetch,
            Some(target.name()),
            format!("clone {} (branch {}, depth 1)", target.source_url(), target.branch),
          ));
          checkout_dir(&settings.workspace, target)
        }
      };

      for step in pipeline.steps(target, &checkout) {
        steps.push(PlannedStep::command(
          Phase::Build,
          Some(target.name()),
          step.step.as_str(),
          step.command,
        ));
      }

      if self.manifest.is_primary(target) {
        primary_checkout = Some(checkout);
      }
    }

    if let (Some(primary), Some(checkout)) = (self.manifest.primary_target(), primary_checkout) {
      for check in verify::checks(&self.manifest.verify, &checkout) {
        steps.push(PlannedStep::command(
          Phase::Verify,
          Some(primary.name()),
          check.check.as_str(),
          check.command,
        ));
      }
    }

    let teardown = if settings.cleanup.removes_after(true) {
      format!("remove {}", settings.workspace.display())
    } else {
      format!("keep {}", settings.workspace.display())
    };
    steps.push(PlannedStep::describe(Phase::Teardown, None, teardown));

    steps
  }
}
