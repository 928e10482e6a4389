//! Source fetching.
//!
//! Each target is cloned into `<workspace>/<repo>` as a shallow, single-branch
//! checkout of its pinned branch. Any directory already at that location is
//! removed first so a run never builds from a stale tree.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::target::BuildTarget;

/// Errors that can occur while fetching a target.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("failed to remove existing checkout '{path}': {source}")]
  RemoveStale {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Network failure, unknown repository, authentication failure.
  #[error("failed to clone repository '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("branch '{branch}' could not be selected: {source}")]
  Branch {
    branch: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("failed to checkout branch '{branch}': {source}")]
  Checkout {
    branch: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("fetch task did not complete: {0}")]
  Interrupted(String),
}

/// Produces a local checkout for a target.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
  /// Fetch `target` into `workspace`, returning the checkout path.
  async fn fetch(&self, target: &BuildTarget, workspace: &Path) -> Result<PathBuf, FetchError>;
}

/// Where a target is checked out inside the workspace.
pub fn checkout_dir(workspace: &Path, target: &BuildTarget) -> PathBuf {
  workspace.join(target.name())
}

/// Fetcher backed by `gix`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitFetcher;

impl GitFetcher {
  pub fn new() -> Self {
    Self
  }
}

impl Fetcher for GitFetcher {
  async fn fetch(&self, target: &BuildTarget, workspace: &Path) -> Result<PathBuf, FetchError> {
    let dest = checkout_dir(workspace, target);

    if tokio::fs::symlink_metadata(&dest).await.is_ok() {
      debug!(path = %dest.display(), "removing existing checkout");
      tokio::fs::remove_dir_all(&dest)
        .await
        .map_err(|source| FetchError::RemoveStale {
          path: dest.clone(),
          source,
        })?;
    }

    let url = target.source_url();
    let branch = target.branch.clone();
    info!(target = %target.name(), url = %url, branch = %branch, "cloning repository");

    let task_dest = dest.clone();
    tokio::task::spawn_blocking(move || clone_branch(&url, &branch, &task_dest))
      .await
      .map_err(|e| FetchError::Interrupted(e.to_string()))??;

    Ok(dest)
  }
}

/// Shallow (depth 1) clone of a single branch.
fn clone_branch(url: &str, branch: &str, dest: &Path) -> Result<(), FetchError> {
  let prepared = gix::prepare_clone(url, dest).map_err(|e| FetchError::Clone {
    url: url.to_string(),
    source: Box::new(e),
  })?;

  let mut prepared = prepared
    .with_shallow(gix::remote::fetch::Shallow::DepthAtRemote(NonZeroU32::MIN))
    .with_ref_name(Some(branch))
    .map_err(|e| FetchError::Branch {
      branch: branch.to_string(),
      source: Box::new(e),
    })?;

  let (mut checkout, _outcome) = prepared
    .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| FetchError::Clone {
      url: url.to_string(),
      source: Box::new(e),
    })?;

  let (_repo, _outcome) = checkout
    .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| FetchError::Checkout {
      branch: branch.to_string(),
      source: Box::new(e),
    })?;

  debug!(path = %dest.display(), "checkout complete");
  Ok(())
}
