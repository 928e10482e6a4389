//! Build target types.
//!
//! A [`BuildTarget`] is one source repository pinned to a branch, together
//! with the configure options it is built with and the install footprint the
//! cleaner removes before a run.

use serde::Serialize;

/// Ordered configure options, passed verbatim.
///
/// Later entries may override earlier ones inside the configure script, so
/// the order is preserved exactly and duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildOptions(Vec<String>);

impl BuildOptions {
  pub fn new(options: Vec<String>) -> Self {
    Self(options)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }
}

impl From<Vec<String>> for BuildOptions {
  fn from(options: Vec<String>) -> Self {
    Self(options)
  }
}

/// Paths a target's install step is known to produce.
///
/// Entries are glob patterns. Relative patterns are resolved against the
/// install prefix; absolute ones are used as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstallFootprint(Vec<String>);

impl InstallFootprint {
  pub fn new(patterns: Vec<String>) -> Self {
    Self(patterns)
  }

  pub fn patterns(&self) -> &[String] {
    &self.0
  }
}

/// One buildable source repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
  pub host: String,
  pub account: String,
  pub repo: String,
  pub branch: String,
  pub options: BuildOptions,
  pub footprint: InstallFootprint,
  /// Command that generates the configure script. Empty means the checkout
  /// already ships one.
  pub bootstrap: Vec<String>,
}

impl BuildTarget {
  /// The target's name, which is its repository name.
  pub fn name(&self) -> &str {
    &self.repo
  }

  /// Clone URL for the target.
  ///
  /// Hosts without a scheme are reached over HTTPS; a host that already
  /// carries one (`file://`, `ssh://`, a mirror URL) is used verbatim.
  pub fn source_url(&self) -> String {
    if self.host.contains("://") {
      format!("{}/{}/{}", self.host.trim_end_matches('/'), self.account, self.repo)
    } else {
      format!("https://{}/{}/{}", self.host, self.account, self.repo)
    }
  }
}
