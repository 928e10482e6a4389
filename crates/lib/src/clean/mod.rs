//! Environment cleaning.
//!
//! Before anything is built, every path a target's install step is known to
//! produce is removed from the install prefix so stale headers or libraries
//! from a previous version can never leak into the new build.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::execute::{CommandLine, ExecuteError, Runner};
use crate::prefix::InstallPrefix;
use crate::target::InstallFootprint;

#[derive(Debug, Error)]
pub enum CleanError {
  #[error("invalid footprint pattern '{pattern}': {source}")]
  Pattern {
    pattern: String,
    #[source]
    source: glob::PatternError,
  },

  #[error("failed to read {path} while expanding footprint: {message}")]
  Glob { path: PathBuf, message: String },

  #[error("failed to remove {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("elevated removal failed: {0}")]
  Elevated(#[from] ExecuteError),
}

/// Expand footprint patterns into the paths that currently exist.
///
/// Patterns that match nothing contribute nothing. The result is sorted and
/// free of duplicates.
pub fn expand<'a>(
  prefix: &InstallPrefix,
  footprints: impl IntoIterator<Item = &'a InstallFootprint>,
) -> Result<Vec<PathBuf>, CleanError> {
  let mut matches = Vec::new();

  for footprint in footprints {
    for pattern in footprint.patterns() {
      let resolved = prefix.resolve(pattern);
      let pattern_str = resolved.to_string_lossy().to_string();

      // A literal path is checked without following symlinks, so dangling
      // symlinks left by an earlier install are still found.
      if !has_wildcards(&pattern_str) {
        if resolved.symlink_metadata().is_ok() {
          matches.push(resolved);
        }
        continue;
      }

      let entries = glob::glob(&pattern_str).map_err(|source| CleanError::Pattern {
        pattern: pattern_str.clone(),
        source,
      })?;

      for entry in entries {
        let path = entry.map_err(|e| CleanError::Glob {
          path: e.path().to_path_buf(),
          message: e.error().to_string(),
        })?;
        matches.push(path);
      }
    }
  }

  matches.sort();
  matches.dedup();
  Ok(matches)
}

/// Remove every existing path covered by the given footprints.
///
/// Missing paths are not an error. When the prefix requires elevation the
/// removal is delegated to `<elevate> rm -rf --` through `runner`.
///
/// # Returns
///
/// The paths that were removed.
pub async fn clean<'a, R: Runner>(
  runner: &R,
  prefix: &InstallPrefix,
  footprints: impl IntoIterator<Item = &'a InstallFootprint>,
) -> Result<Vec<PathBuf>, CleanError> {
  let paths = expand(prefix, footprints)?;

  if paths.is_empty() {
    info!(prefix = %prefix.root().display(), "no previous installation found");
    return Ok(paths);
  }

  info!(count = paths.len(), prefix = %prefix.root().display(), "removing previous installation");

  match prefix.elevation() {
    Some(via) => {
      let command = CommandLine::new(via)
        .args(["rm", "-rf", "--"])
        .args(paths.iter().map(|p| p.to_string_lossy().to_string()));
      runner.run(&command).await?;
    }
    None => {
      for path in &paths {
        remove_path(path)?;
      }
    }
  }

  Ok(paths)
}

fn remove_path(path: &Path) -> Result<(), CleanError> {
  let metadata = match path.symlink_metadata() {
    Ok(metadata) => metadata,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
    Err(source) => {
      return Err(CleanError::Remove {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  debug!(path = %path.display(), "removing footprint path");

  let result = if metadata.is_dir() {
    std::fs::remove_dir_all(path)
  } else {
    std::fs::remove_file(path)
  };

  match result {
    Ok(()) => Ok(()),
    // Already gone, e.g. inside a directory removed earlier in this pass.
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(source) => Err(CleanError::Remove {
      path: path.to_path_buf(),
      source,
    }),
  }
}

fn has_wildcards(pattern: &str) -> bool {
  pattern.contains(['*', '?', '['])
}
