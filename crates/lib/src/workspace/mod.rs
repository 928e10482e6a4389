//! Scratch workspace management.
//!
//! All clones and builds of a run happen inside a single workspace
//! directory. It is recreated from scratch at the start of every run and
//! initialised as a git repository with a fixed anonymous identity, so
//! clone and diff tooling works inside it on machines with no global git
//! configuration.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{WORKSPACE_USER_EMAIL, WORKSPACE_USER_NAME};

#[derive(Debug, Error)]
pub enum WorkspaceError {
  /// A stale workspace from an earlier run is in the way and cannot be removed.
  #[error("workspace {path} exists and cannot be cleared: {source}")]
  ExistsAndCannotBeCleared {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The workspace path equals or contains a directory the run still needs.
  #[error("workspace {path} would remove {protected}")]
  Encloses { path: PathBuf, protected: PathBuf },

  #[error("failed to create workspace {path}: {source}")]
  Create {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to initialise repository in {path}: {source}")]
  Init {
    path: PathBuf,
    #[source]
    source: Box<gix::init::Error>,
  },

  #[error("failed to write repository identity in {path}: {source}")]
  Identity {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to remove workspace {path}: {source}")]
  Destroy {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A freshly created workspace. One exists per run.
#[derive(Debug, Clone)]
pub struct WorkspaceState {
  /// Absolute path of the workspace directory.
  pub root: PathBuf,
  pub created_at: SystemTime,
}

/// Create a fresh workspace at `path`, replacing any stale one.
///
/// Refuses a path that equals or contains the current directory or any of
/// `protected`, since replacing it would delete them.
pub fn create(path: &Path, protected: &[&Path]) -> Result<WorkspaceState, WorkspaceError> {
  ensure_disjoint(path, protected)?;

  if path.symlink_metadata().is_ok() {
    debug!(path = %path.display(), "removing stale workspace");
    remove(path).map_err(|source| WorkspaceError::ExistsAndCannotBeCleared {
      path: path.to_path_buf(),
      source,
    })?;
  }

  fs::create_dir_all(path).map_err(|source| WorkspaceError::Create {
    path: path.to_path_buf(),
    source,
  })?;

  let root = dunce::canonicalize(path).map_err(|source| WorkspaceError::Create {
    path: path.to_path_buf(),
    source,
  })?;

  let repo = gix::init(&root).map_err(|e| WorkspaceError::Init {
    path: root.clone(),
    source: Box::new(e),
  })?;

  write_identity(&repo.git_dir().join("config")).map_err(|source| WorkspaceError::Identity {
    path: root.clone(),
    source,
  })?;

  info!(path = %root.display(), "workspace ready");

  Ok(WorkspaceState {
    root,
    created_at: SystemTime::now(),
  })
}

/// Remove the workspace. Succeeds if it does not exist.
pub fn destroy(path: &Path) -> Result<(), WorkspaceError> {
  match remove(path) {
    Ok(()) => {
      info!(path = %path.display(), "workspace removed");
      Ok(())
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(source) => Err(WorkspaceError::Destroy {
      path: path.to_path_buf(),
      source,
    }),
  }
}

fn ensure_disjoint(path: &Path, protected: &[&Path]) -> Result<(), WorkspaceError> {
  let create_error = |source: io::Error| WorkspaceError::Create {
    path: path.to_path_buf(),
    source,
  };

  let workspace = resolve(path).map_err(create_error)?;
  let cwd = std::env::current_dir().map_err(create_error)?;

  for keep in std::iter::once(cwd.as_path()).chain(protected.iter().copied()) {
    let keep = resolve(keep).map_err(create_error)?;
    if keep.starts_with(&workspace) {
      return Err(WorkspaceError::Encloses {
        path: workspace,
        protected: keep,
      });
    }
  }

  Ok(())
}

/// Absolute, `..`-free form of `path`, with symlinks resolved for the part
/// that exists.
fn resolve(path: &Path) -> io::Result<PathBuf> {
  let mut normal = PathBuf::new();
  for component in std::path::absolute(path)?.components() {
    match component {
      Component::ParentDir => {
        normal.pop();
      }
      Component::CurDir => {}
      other => normal.push(other),
    }
  }

  for ancestor in normal.ancestors() {
    if let Ok(real) = dunce::canonicalize(ancestor) {
      let rest = normal.strip_prefix(ancestor).unwrap_or(Path::new(""));
      if rest.as_os_str().is_empty() {
        return Ok(real);
      }
      return Ok(real.join(rest));
    }
  }

  Ok(normal)
}

fn remove(path: &Path) -> io::Result<()> {
  if path.symlink_metadata()?.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  }
}

fn write_identity(config_path: &Path) -> io::Result<()> {
  let mut config = OpenOptions::new().append(true).create(true).open(config_path)?;
  write!(
    config,
    "[user]\n\tname = {}\n\temail = {}\n",
    WORKSPACE_USER_NAME, WORKSPACE_USER_EMAIL
  )?;
  config.flush()
}
