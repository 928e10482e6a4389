//! Build file loading.
//!
//! The manifest is the ordered list of [`BuildTarget`]s for one run plus the
//! settings every step shares: the install prefix, workspace location,
//! compile parallelism, cleanup policy and verification commands.

pub mod types;

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_HOST, DEFAULT_PREFIX, DEFAULT_TEST_ARGS, DEFAULT_WORKSPACE};
use crate::platform;
use crate::prefix::InstallPrefix;
use crate::target::{BuildOptions, BuildTarget, InstallFootprint};

use types::{ManifestFile, TargetDef};

/// Errors that can occur while loading a build file.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read build file '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid build file: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("build file declares no targets")]
  NoTargets,

  #[error("target '{0}' is declared more than once")]
  DuplicateTarget(String),

  #[error("target #{index} has an empty '{field}'")]
  EmptyField { index: usize, field: &'static str },

  /// The repo name doubles as the checkout directory, so it must be a single
  /// plain path component.
  #[error("target #{index} has invalid repo name '{repo}'")]
  InvalidRepo { index: usize, repo: String },

  #[error("primary target '{0}' is not declared")]
  UnknownPrimary(String),

  #[error("jobs must be greater than zero")]
  InvalidJobs,
}

/// When the workspace is removed at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupPolicy {
  /// Remove the workspace whatever the outcome.
  Always,
  /// Remove it after a fully successful run; keep it for inspection otherwise.
  #[default]
  OnSuccess,
  /// Never remove it.
  Never,
}

impl CleanupPolicy {
  pub fn removes_after(self, success: bool) -> bool {
    match self {
      CleanupPolicy::Always => true,
      CleanupPolicy::OnSuccess => success,
      CleanupPolicy::Never => false,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      CleanupPolicy::Always => "always",
      CleanupPolicy::OnSuccess => "on-success",
      CleanupPolicy::Never => "never",
    }
  }
}

impl fmt::Display for CleanupPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CleanupPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "always" => Ok(CleanupPolicy::Always),
      "on-success" => Ok(CleanupPolicy::OnSuccess),
      "never" => Ok(CleanupPolicy::Never),
      other => Err(format!(
        "unknown cleanup policy '{}' (expected always, on-success or never)",
        other
      )),
    }
  }
}

/// Settings shared by every step of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub prefix: InstallPrefix,
  /// Scratch directory, relative to the current directory unless absolute.
  pub workspace: PathBuf,
  /// Parallel compile jobs handed to `make -j`.
  pub jobs: usize,
  pub cleanup: CleanupPolicy,
  /// Run `ldconfig` after each install on platforms that have a linker cache.
  pub refresh_linker_cache: bool,
}

/// External tool names, overridable for non-standard toolchains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
  pub configure: String,
  pub make: String,
  pub ldconfig: String,
}

impl Default for Tools {
  fn default() -> Self {
    Self {
      configure: "./configure".to_string(),
      make: "make".to_string(),
      ldconfig: "ldconfig".to_string(),
    }
  }
}

/// Post-install checks for the primary target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyConfig {
  /// Unit-test binary, relative to the primary target's checkout.
  pub test_binary: Option<PathBuf>,
  pub test_args: Vec<String>,
  /// Installed CLI invocation whose exit code is checked.
  pub smoke: Vec<String>,
}

/// A validated build file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
  pub settings: Settings,
  pub tools: Tools,
  /// Targets in build order.
  pub targets: Vec<BuildTarget>,
  /// Name of the target the verifier runs against.
  pub primary: Option<String>,
  pub verify: VerifyConfig,
}

impl Manifest {
  /// Load and validate a build file from disk.
  pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    debug!(path = %path.display(), "loaded build file");
    Self::from_toml(&content)
  }

  /// Parse and validate build file contents.
  pub fn from_toml(content: &str) -> Result<Self, ManifestError> {
    let file: ManifestFile = toml::from_str(content)?;
    Self::from_file_def(file)
  }

  fn from_file_def(file: ManifestFile) -> Result<Self, ManifestError> {
    if file.targets.is_empty() {
      return Err(ManifestError::NoTargets);
    }

    let jobs = match file.jobs {
      Some(0) => return Err(ManifestError::InvalidJobs),
      Some(jobs) => jobs,
      None => platform::host_parallelism(),
    };

    let host = file.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let mut targets: Vec<BuildTarget> = Vec::with_capacity(file.targets.len());
    for (index, def) in file.targets.into_iter().enumerate() {
      let target = convert_target(index, def, &host)?;
      if targets.iter().any(|t| t.name() == target.name()) {
        return Err(ManifestError::DuplicateTarget(target.repo));
      }
      targets.push(target);
    }

    if let Some(primary) = &file.primary
      && !targets.iter().any(|t| t.name() == primary)
    {
      return Err(ManifestError::UnknownPrimary(primary.clone()));
    }

    let defaults = Tools::default();
    let tools = Tools {
      configure: file.tools.configure.unwrap_or(defaults.configure),
      make: file.tools.make.unwrap_or(defaults.make),
      ldconfig: file.tools.ldconfig.unwrap_or(defaults.ldconfig),
    };

    let verify = VerifyConfig {
      test_binary: file.verify.test_binary,
      test_args: file
        .verify
        .test_args
        .unwrap_or_else(|| DEFAULT_TEST_ARGS.iter().map(|s| s.to_string()).collect()),
      smoke: file.verify.smoke,
    };

    let settings = Settings {
      prefix: InstallPrefix::new(
        file.prefix.unwrap_or_else(|| PathBuf::from(DEFAULT_PREFIX)),
        file.elevate,
      ),
      workspace: file.workspace.unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE)),
      jobs,
      cleanup: file.cleanup.unwrap_or_default(),
      refresh_linker_cache: file.refresh_linker_cache.unwrap_or(true),
    };

    debug!(targets = targets.len(), jobs, "build file validated");

    Ok(Self {
      settings,
      tools,
      targets,
      primary: file.primary,
      verify,
    })
  }

  /// The primary target, if one is declared.
  pub fn primary_target(&self) -> Option<&BuildTarget> {
    let primary = self.primary.as_deref()?;
    self.targets.iter().find(|t| t.name() == primary)
  }

  pub fn is_primary(&self, target: &BuildTarget) -> bool {
    self.primary.as_deref() == Some(target.name())
  }
}

fn convert_target(index: usize, def: TargetDef, default_host: &str) -> Result<BuildTarget, ManifestError> {
  for (field, value) in [("account", &def.account), ("repo", &def.repo), ("branch", &def.branch)] {
    if value.trim().is_empty() {
      return Err(ManifestError::EmptyField { index, field });
    }
  }

  if !is_plain_name(&def.repo) {
    return Err(ManifestError::InvalidRepo { index, repo: def.repo });
  }

  Ok(BuildTarget {
    host: def.host.unwrap_or_else(|| default_host.to_string()),
    account: def.account,
    repo: def.repo,
    branch: def.branch,
    options: BuildOptions::new(def.options),
    footprint: InstallFootprint::new(def.footprint),
    bootstrap: def.bootstrap.unwrap_or_else(|| vec!["./autogen.sh".to_string()]),
  })
}

fn is_plain_name(name: &str) -> bool {
  if name.contains(['/', '\\']) {
    return false;
  }
  let mut components = Path::new(name).components();
  matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}
