//! Test utilities for srcbuild-lib.
//!
//! Provides recording doubles for the [`Runner`] and [`Fetcher`] seams that
//! share a single journal, so tests can assert on the exact interleaving of
//! fetches and commands across targets.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::execute::{CommandLine, ExecuteError, Runner};
use crate::fetch::{FetchError, Fetcher, checkout_dir};
use crate::manifest::{CleanupPolicy, Manifest, Settings, Tools, VerifyConfig};
use crate::prefix::InstallPrefix;
use crate::target::{BuildOptions, BuildTarget, InstallFootprint};

/// A single observed side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  Fetch(String),
  Run(CommandLine),
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

pub fn journal() -> Journal {
  Rc::new(RefCell::new(Vec::new()))
}

type Matcher = Box<dyn Fn(&CommandLine) -> bool>;

/// Runner that records every command and fails the ones it is told to.
pub struct RecordingRunner {
  journal: Journal,
  failures: Vec<(Matcher, i32)>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::with_journal(journal())
  }

  pub fn with_journal(journal: Journal) -> Self {
    Self {
      journal,
      failures: Vec::new(),
    }
  }

  /// Make every command matching `matcher` exit with `code`.
  pub fn fail_on(mut self, matcher: impl Fn(&CommandLine) -> bool + 'static, code: i32) -> Self {
    self.failures.push((Box::new(matcher), code));
    self
  }

  /// Commands run so far, in order.
  pub fn commands(&self) -> Vec<CommandLine> {
    self
      .journal
      .borrow()
      .iter()
      .filter_map(|call| match call {
        Call::Run(cmd) => Some(cmd.clone()),
        Call::Fetch(_) => None,
      })
      .collect()
  }
}

impl Runner for RecordingRunner {
  async fn run(&self, command: &CommandLine) -> Result<(), ExecuteError> {
    self.journal.borrow_mut().push(Call::Run(command.clone()));

    match self.failures.iter().find(|(matcher, _)| matcher(command)) {
      Some((_, code)) => Err(ExecuteError::CmdFailed {
        cmd: command.to_string(),
        code: Some(*code),
      }),
      None => Ok(()),
    }
  }
}

/// Fetcher that creates an empty checkout directory instead of cloning.
pub struct FakeFetcher {
  journal: Journal,
  fail_repo: Option<String>,
}

impl FakeFetcher {
  pub fn new(journal: Journal) -> Self {
    Self { journal, fail_repo: None }
  }

  pub fn failing_on(mut self, repo: &str) -> Self {
    self.fail_repo = Some(repo.to_string());
    self
  }

  /// Names of the targets fetched so far, in order.
  pub fn fetched(&self) -> Vec<String> {
    self
      .journal
      .borrow()
      .iter()
      .filter_map(|call| match call {
        Call::Fetch(name) => Some(name.clone()),
        Call::Run(_) => None,
      })
      .collect()
  }
}

impl Fetcher for FakeFetcher {
  async fn fetch(&self, target: &BuildTarget, workspace: &Path) -> Result<PathBuf, FetchError> {
    self.journal.borrow_mut().push(Call::Fetch(target.name().to_string()));

    if self.fail_repo.as_deref() == Some(target.name()) {
      return Err(FetchError::Clone {
        url: target.source_url(),
        source: "remote branch not found".into(),
      });
    }

    let dest = checkout_dir(workspace, target);
    std::fs::create_dir_all(&dest).map_err(|source| FetchError::RemoveStale {
      path: dest.clone(),
      source,
    })?;
    Ok(dest)
  }
}

/// A target with default bootstrap and no options.
pub fn test_target(repo: &str) -> BuildTarget {
  BuildTarget {
    host: "github.com".to_string(),
    account: "libbitcoin".to_string(),
    repo: repo.to_string(),
    branch: "master".to_string(),
    options: BuildOptions::default(),
    footprint: InstallFootprint::default(),
    bootstrap: vec!["./autogen.sh".to_string()],
  }
}

/// A manifest around `targets` with deterministic settings.
pub fn manifest_with_targets(targets: Vec<BuildTarget>) -> Manifest {
  Manifest {
    settings: Settings {
      prefix: InstallPrefix::new("/usr/local", None),
      workspace: PathBuf::from("build-srcbuild"),
      jobs: 4,
      cleanup: CleanupPolicy::OnSuccess,
      refresh_linker_cache: false,
    },
    tools: Tools::default(),
    targets,
    primary: None,
    verify: VerifyConfig::default(),
  }
}

/// Run a shell snippet.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> CommandLine {
  CommandLine::new("/bin/sh").args(["-c", script])
}

/// Create an empty marker file in the command's working directory.
#[cfg(unix)]
pub fn touch_file(filename: &str) -> CommandLine {
  CommandLine::new("touch").arg(filename)
}
