//! Repository synchronizer
//!
//! Brings every tracked component clone to the tip of its tracking branch:
//! clone if absent, scrub local changes, check out the branch, fast-forward.
//! Running it twice with no upstream movement leaves every HEAD unchanged.
//! The first failure aborts the whole pass; nothing is retried or rolled back.

use crate::core::config::ComponentConfig;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::core::vcs::VersionControl;
use crate::ui::progress::ComponentProgress;
use crate::utils::repo_url;
use std::fs;
use std::path::{Path, PathBuf};

/// State of one component after synchronization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedComponent {
  pub name: String,
  pub branch: String,
  pub head: String,
  /// Whether this pass created the clone
  pub cloned: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
  pub components: Vec<SyncedComponent>,
}

impl SyncReport {
  pub fn head_of(&self, name: &str) -> Option<&str> {
    self
      .components
      .iter()
      .find(|c| c.name == name)
      .map(|c| c.head.as_str())
  }
}

pub struct RepositorySynchronizer<'a> {
  vcs: &'a dyn VersionControl,
  remote_root: &'a str,
  src_dir: PathBuf,
  base_branch: &'a str,
  show_progress: bool,
}

impl<'a> RepositorySynchronizer<'a> {
  pub fn new(vcs: &'a dyn VersionControl, remote_root: &'a str, src_dir: &Path, base_branch: &'a str) -> Self {
    Self {
      vcs,
      remote_root,
      src_dir: src_dir.to_path_buf(),
      base_branch,
      show_progress: false,
    }
  }

  /// Draw a progress bar while synchronizing
  pub fn with_progress(mut self, show: bool) -> Self {
    self.show_progress = show;
    self
  }

  /// Synchronize every component, in order
  pub fn synchronize(&self, components: &[ComponentConfig]) -> ReleaseResult<SyncReport> {
    fs::create_dir_all(&self.src_dir)
      .with_context(|| format!("Failed to create source directory {}", self.src_dir.display()))?;

    let mut progress = self
      .show_progress
      .then(|| ComponentProgress::new(components.len(), "Synchronizing components"));

    let mut report = SyncReport::default();
    for component in components {
      let synced = self
        .synchronize_one(component)
        .with_context(|| format!("Failed to synchronize component '{}'", component.name))?;
      tracing::info!(
        component = %synced.name,
        branch = %synced.branch,
        head = %synced.head,
        cloned = synced.cloned,
        "synchronized"
      );
      report.components.push(synced);
      if let Some(progress) = progress.as_mut() {
        progress.inc();
      }
    }

    Ok(report)
  }

  fn synchronize_one(&self, component: &ComponentConfig) -> ReleaseResult<SyncedComponent> {
    let repo = self.src_dir.join(&component.name);
    let branch = component.tracking_branch(self.base_branch);

    let cloned = if repo.exists() {
      false
    } else {
      let url = repo_url(self.remote_root, &component.name);
      self.vcs.clone_repo(&url, &repo)?;
      true
    };

    self.vcs.clean(&repo)?;
    self.vcs.checkout_branch(&repo, &branch)?;
    self.vcs.pull_fast_forward(&repo, &branch)?;
    let head = self.vcs.head_commit(&repo)?;

    Ok(SyncedComponent {
      name: component.name.clone(),
      branch,
      head,
      cloned,
    })
  }
}
