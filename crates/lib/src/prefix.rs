//! The shared system install prefix.
//!
//! Every target installs into the same prefix, and later targets build
//! against what earlier ones installed there. [`InstallPrefix`] makes that
//! shared resource explicit and carries the policy for privileged writes.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::platform;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPrefix {
  root: PathBuf,
  /// Tool used to elevate privileged steps (e.g. `sudo`).
  elevate: Option<String>,
}

impl InstallPrefix {
  pub fn new(root: impl Into<PathBuf>, elevate: Option<String>) -> Self {
    Self {
      root: root.into(),
      elevate,
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// The elevation tool to wrap privileged commands in.
  ///
  /// Returns `None` when no tool is configured or the process already runs
  /// as root.
  pub fn elevation(&self) -> Option<&str> {
    self.elevate.as_deref().filter(|_| !platform::is_elevated())
  }

  /// Resolve a footprint pattern against the prefix.
  pub fn resolve(&self, pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }

  /// The `--prefix=` flag handed to every configure script.
  pub fn configure_flag(&self) -> String {
    format!("--prefix={}", self.root.display())
  }
}
