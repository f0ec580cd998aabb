//! Release ledger: has the newest umbrella tag already been published?

use crate::core::error::{ReleaseResult, ResultExt};
use crate::core::vcs::VersionControl;
use crate::release::host::ReleaseHost;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Tags already published on the hosting service
///
/// Fetched once per run; the remote is the source of truth, so this is never
/// modified locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseSet {
  tags: BTreeSet<String>,
}

impl ReleaseSet {
  pub fn fetch(host: &dyn ReleaseHost) -> ReleaseResult<Self> {
    Ok(host.list_release_tags()?.into_iter().collect())
  }

  pub fn contains(&self, tag: &str) -> bool {
    self.tags.contains(tag)
  }

  pub fn len(&self) -> usize {
    self.tags.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tags.is_empty()
  }
}

impl FromIterator<String> for ReleaseSet {
  fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
    Self {
      tags: iter.into_iter().collect(),
    }
  }
}

/// What a run should do about the newest tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
  /// The umbrella repository has no tags at all
  NoTags,
  /// Newest tag is already published; nothing to do
  AlreadyReleased(String),
  /// Newest tag still needs building / releasing
  Process(String),
}

impl Decision {
  /// `Process` unless the newest tag is in `released`
  pub fn decide(latest: Option<&str>, released: &ReleaseSet) -> Self {
    match latest {
      None => Decision::NoTags,
      Some(tag) if released.contains(tag) => Decision::AlreadyReleased(tag.to_string()),
      Some(tag) => Decision::Process(tag.to_string()),
    }
  }
}

/// Newest tag of the umbrella repository
///
/// Removes any previous checkout at `dest`, clones `url` fresh and returns the
/// last entry of the tag listing. Listing order is refname order, not
/// creation time or version order.
pub fn latest_tag(vcs: &dyn VersionControl, url: &str, dest: &Path) -> ReleaseResult<Option<String>> {
  if dest.exists() {
    fs::remove_dir_all(dest).with_context(|| format!("Failed to remove stale checkout {}", dest.display()))?;
  }
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent)?;
  }
  vcs.clone_repo(url, dest)?;

  let tags = vcs.list_tags(dest)?;
  tracing::debug!(count = tags.len(), last = ?tags.last(), "umbrella tags");
  Ok(tags.last().cloned())
}
