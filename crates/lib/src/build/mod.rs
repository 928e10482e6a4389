//! Target build pipeline.
//!
//! Every target goes through the same fixed pipeline inside its checkout:
//!
//! 1. Bootstrap: generate the configure script (`./autogen.sh`)
//! 2. Configure: `./configure --prefix=<prefix> <target options> <pass-through options>`
//! 3. Compile: `make -j<jobs>`
//! 4. Install: `make install`, then `ldconfig` where the platform has a linker cache
//!
//! Only the install commands are elevated. Any non-zero exit aborts the
//! pipeline immediately.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::OrchestratorError;
use crate::execute::{CommandLine, ExecuteError, Runner};
use crate::manifest::{Manifest, Tools};
use crate::platform::Os;
use crate::prefix::InstallPrefix;
use crate::target::BuildTarget;

/// A stage of the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
  Bootstrap,
  Configure,
  Compile,
  Install,
  RefreshLinkerCache,
}

impl Step {
  pub fn as_str(self) -> &'static str {
    match self {
      Step::Bootstrap => "bootstrap",
      Step::Configure => "configure",
      Step::Compile => "compile",
      Step::Install => "install",
      Step::RefreshLinkerCache => "refresh-linker-cache",
    }
  }

  /// Wrap a command failure in the run-level error for this step.
  ///
  /// A failed linker-cache refresh counts as a failed install.
  pub fn failure(self, target: &str, source: ExecuteError) -> OrchestratorError {
    let target = target.to_string();
    match self {
      Step::Bootstrap => OrchestratorError::BootstrapFailed { target, source },
      Step::Configure => OrchestratorError::ConfigureFailed { target, source },
      Step::Compile => OrchestratorError::CompileFailed { target, source },
      Step::Install | Step::RefreshLinkerCache => OrchestratorError::InstallFailed { target, source },
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One resolved command of a target's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStep {
  pub step: Step,
  pub command: CommandLine,
}

/// Resolves the pipeline commands for targets of one run.
#[derive(Debug, Clone)]
pub struct BuildPipeline<'a> {
  prefix: &'a InstallPrefix,
  tools: &'a Tools,
  jobs: usize,
  refresh_linker_cache: bool,
  extra_options: &'a [String],
}

impl<'a> BuildPipeline<'a> {
  /// `extra_options` are appended to every target's configure line.
  pub fn new(manifest: &'a Manifest, extra_options: &'a [String]) -> Self {
    let has_linker_cache = Os::current().is_some_and(|os| os.has_linker_cache());
    Self {
      prefix: &manifest.settings.prefix,
      tools: &manifest.tools,
      jobs: manifest.settings.jobs,
      refresh_linker_cache: manifest.settings.refresh_linker_cache && has_linker_cache,
      extra_options,
    }
  }

  /// The commands that build `target` in `checkout`, in execution order.
  pub fn steps(&self, target: &BuildTarget, checkout: &Path) -> Vec<PipelineStep> {
    let mut steps = Vec::with_capacity(5);
    let elevate = self.prefix.elevation();

    if let Some(bootstrap) = CommandLine::from_argv(&target.bootstrap) {
      steps.push(PipelineStep {
        step: Step::Bootstrap,
        command: bootstrap.current_dir(checkout),
      });
    }

    steps.push(PipelineStep {
      step: Step::Configure,
      command: CommandLine::new(&self.tools.configure)
        .arg(self.prefix.configure_flag())
        .args(target.options.iter())
        .args(self.extra_options.iter().cloned())
        .current_dir(checkout),
    });

    steps.push(PipelineStep {
      step: Step::Compile,
      command: CommandLine::new(&self.tools.make)
        .arg(format!("-j{}", self.jobs))
        .current_dir(checkout),
    });

    steps.push(PipelineStep {
      step: Step::Install,
      command: CommandLine::new(&self.tools.make)
        .arg("install")
        .current_dir(checkout)
        .elevated(elevate),
    });

    if self.refresh_linker_cache {
      steps.push(PipelineStep {
        step: Step::RefreshLinkerCache,
        command: CommandLine::new(&self.tools.ldconfig).elevated(elevate),
      });
    }

    steps
  }
}

/// Run the full pipeline for one target, stopping at the first failure.
pub async fn build<R: Runner>(
  runner: &R,
  pipeline: &BuildPipeline<'_>,
  target: &BuildTarget,
  checkout: &Path,
) -> Result<(), OrchestratorError> {
  for PipelineStep { step, command } in pipeline.steps(target, checkout) {
    info!(target = %target.name(), step = %step, "starting step");
    runner
      .run(&command)
      .await
      .map_err(|source| step.failure(target.name(), source))?;
  }

  info!(target = %target.name(), "target installed");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{RecordingRunner, manifest_with_targets, test_target};
  use std::path::PathBuf;

  #[test]
  fn configure_options_keep_declared_order() {
    let mut target = test_target("libsodium");
    target.options = vec!["--x=1".to_string(), "--x=2".to_string()].into();
    let manifest = manifest_with_targets(vec![target.clone()]);
    let extra = vec!["--with-pic".to_string(), "--x=3".to_string()];
    let pipeline = BuildPipeline::new(&manifest, &extra);

    let steps = pipeline.steps(&target, Path::new("/ws/libsodium"));
    let configure = steps.iter().find(|s| s.step == Step::Configure).unwrap();

    assert_eq!(
      configure.command.args,
      vec!["--prefix=/usr/local", "--x=1", "--x=2", "--with-pic", "--x=3"]
    );
    assert_eq!(configure.command.working_dir(), Some(Path::new("/ws/libsodium")));
  }

  #[test]
  fn pipeline_runs_in_fixed_order() {
    let target = test_target("libzmq");
    let manifest = manifest_with_targets(vec![target.clone()]);
    let pipeline = BuildPipeline::new(&manifest, &[]);

    let steps: Vec<_> = pipeline
      .steps(&target, Path::new("/ws/libzmq"))
      .into_iter()
      .map(|s| s.step)
      .collect();

    assert_eq!(steps, vec![Step::Bootstrap, Step::Configure, Step::Compile, Step::Install]);
  }

  #[test]
  fn compile_uses_configured_jobs() {
    let target = test_target("libzmq");
    let mut manifest = manifest_with_targets(vec![target.clone()]);
    manifest.settings.jobs = 7;
    let pipeline = BuildPipeline::new(&manifest, &[]);

    let steps = pipeline.steps(&target, Path::new("/ws/libzmq"));
    let compile = steps.iter().find(|s| s.step == Step::Compile).unwrap();

    assert_eq!(compile.command.to_string(), "make -j7");
  }

  #[test]
  fn empty_bootstrap_is_skipped() {
    let mut target = test_target("gmp");
    target.bootstrap = Vec::new();
    let manifest = manifest_with_targets(vec![target.clone()]);
    let pipeline = BuildPipeline::new(&manifest, &[]);

    let steps = pipeline.steps(&target, Path::new("/ws/gmp"));

    assert_eq!(steps[0].step, Step::Configure);
  }

  #[test]
  #[cfg(target_os = "linux")]
  fn linker_cache_refreshed_after_install_on_linux() {
    let target = test_target("libzmq");
    let mut manifest = manifest_with_targets(vec![target.clone()]);
    manifest.settings.refresh_linker_cache = true;
    let pipeline = BuildPipeline::new(&manifest, &[]);

    let steps = pipeline.steps(&target, Path::new("/ws/libzmq"));
    let last = steps.last().unwrap();

    assert_eq!(last.step, Step::RefreshLinkerCache);
    assert_eq!(last.command.program, "ldconfig");
  }

  #[tokio::test]
  async fn configure_failure_stops_pipeline() {
    let target = test_target("libzmq");
    let manifest = manifest_with_targets(vec![target.clone()]);
    let pipeline = BuildPipeline::new(&manifest, &[]);
    let runner = RecordingRunner::new().fail_on(|cmd| cmd.program == "./configure", 3);

    let result = build(&runner, &pipeline, &target, &PathBuf::from("/ws/libzmq")).await;

    let err = result.unwrap_err();
    assert!(matches!(err, OrchestratorError::ConfigureFailed { ref target, .. } if target == "libzmq"));
    assert_eq!(err.exit_code(), 3);

    let programs: Vec<_> = runner.commands().into_iter().map(|c| c.program).collect();
    assert_eq!(programs, vec!["./autogen.sh", "./configure"]);
  }

  #[tokio::test]
  async fn successful_build_runs_every_step() {
    let target = test_target("secp256k1");
    let manifest = manifest_with_targets(vec![target.clone()]);
    let pipeline = BuildPipeline::new(&manifest, &[]);
    let runner = RecordingRunner::new();

    build(&runner, &pipeline, &target, Path::new("/ws/secp256k1"))
      .await
      .unwrap();

    let lines: Vec<_> = runner.commands().iter().map(|c| c.to_string()).collect();
    assert_eq!(
      lines,
      vec![
        "./autogen.sh",
        "./configure --prefix=/usr/local",
        format!("make -j{}", manifest.settings.jobs).as_str(),
        "make install",
      ]
    );
  }

  #[test]
  fn refresh_failure_is_install_failure() {
    let err = Step::RefreshLinkerCache.failure(
      "libzmq",
      ExecuteError::CmdFailed {
        cmd: "ldconfig".to_string(),
        code: Some(1),
      },
    );
    assert!(matches!(err, OrchestratorError::InstallFailed { .. }));
  }
}
