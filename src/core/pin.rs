//! Revision pinner
//!
//! Pins the umbrella repository to a release tag, reads its manifest and
//! checks every component out at the recorded commit. The stages are
//! separate values so they can only run in order:
//!
//! ```text
//! RevisionPinner::pin_umbrella(tag)        -> PinnedUmbrella   (tag checked out, description read)
//! RevisionPinner::resolve(PinnedUmbrella)  -> ResolvedRevisions (manifest read, every component resolved)
//! RevisionPinner::pin_components(resolved) -> PinnedRun         (every component at its revision)
//! ```
//!
//! The first component that cannot be resolved or checked out aborts the run.

use crate::core::error::{ManifestError, ReleaseResult, ResultExt};
use crate::core::vcs::VersionControl;
use crate::manifest::{Manifest, PinnedRevision};
use std::path::{Path, PathBuf};

/// Tag a release is cut from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
  pub name: String,
  /// Commit message at the tag
  pub description: String,
  /// Tag name without its `v-` (or `v`) prefix
  pub version: String,
}

impl TagInfo {
  /// Derive the package version from a tag name
  ///
  /// Release tags are `v-<version>`; the two-character prefix is dropped.
  /// A plain `v<digit>...` tag drops just the `v`.
  pub fn version_of(tag: &str) -> String {
    if let Some(rest) = tag.strip_prefix("v-") {
      return rest.to_string();
    }
    if let Some(rest) = tag.strip_prefix('v')
      && rest.starts_with(|c: char| c.is_ascii_digit())
    {
      return rest.to_string();
    }
    tag.to_string()
  }

  /// Tags marked `formal release` in their message are published as full releases
  pub fn is_formal_release(&self) -> bool {
    self.description.contains("formal release")
  }
}

/// Umbrella checked out at the tag, manifest not yet read
#[derive(Debug)]
pub struct PinnedUmbrella {
  pub tag: TagInfo,
}

/// Every component has a non-empty revision, nothing checked out yet
#[derive(Debug)]
pub struct ResolvedRevisions {
  pub tag: TagInfo,
  pub revisions: Vec<PinnedRevision>,
}

/// Terminal state: umbrella and every component pinned
#[derive(Debug, Clone)]
pub struct PinnedRun {
  pub tag: TagInfo,
  pub revisions: Vec<PinnedRevision>,
}

impl PinnedRun {
  pub fn version(&self) -> &str {
    &self.tag.version
  }

  pub fn revision_of(&self, component: &str) -> Option<&str> {
    self
      .revisions
      .iter()
      .find(|r| r.component == component)
      .map(|r| r.revision.as_str())
  }
}

pub struct RevisionPinner<'a> {
  vcs: &'a dyn VersionControl,
  src_dir: PathBuf,
  umbrella: &'a str,
  manifest_file: &'a str,
}

impl<'a> RevisionPinner<'a> {
  pub fn new(vcs: &'a dyn VersionControl, src_dir: &Path, umbrella: &'a str, manifest_file: &'a str) -> Self {
    Self {
      vcs,
      src_dir: src_dir.to_path_buf(),
      umbrella,
      manifest_file,
    }
  }

  fn umbrella_dir(&self) -> PathBuf {
    self.src_dir.join(self.umbrella)
  }

  /// Run all three stages
  pub fn pin<S: AsRef<str>>(&self, tag: &str, components: &[S]) -> ReleaseResult<PinnedRun> {
    let umbrella = self.pin_umbrella(tag)?;
    let resolved = self.resolve(umbrella, components)?;
    self.pin_components(resolved)
  }

  pub fn pin_umbrella(&self, tag: &str) -> ReleaseResult<PinnedUmbrella> {
    let repo = self.umbrella_dir();
    self.vcs.clean(&repo)?;
    self
      .vcs
      .checkout_detached(&repo, tag)
      .with_context(|| format!("Failed to check out tag {} on {}", tag, self.umbrella))?;
    let description = self.vcs.commit_message(&repo, "HEAD")?;

    tracing::info!(tag, umbrella = self.umbrella, "umbrella pinned");
    Ok(PinnedUmbrella {
      tag: TagInfo {
        name: tag.to_string(),
        description,
        version: TagInfo::version_of(tag),
      },
    })
  }

  pub fn resolve<S: AsRef<str>>(&self, umbrella: PinnedUmbrella, components: &[S]) -> ReleaseResult<ResolvedRevisions> {
    let manifest = Manifest::load(&self.umbrella_dir(), self.manifest_file)?;
    let revisions = manifest.resolve(components)?;
    Ok(ResolvedRevisions {
      tag: umbrella.tag,
      revisions,
    })
  }

  pub fn pin_components(&self, resolved: ResolvedRevisions) -> ReleaseResult<PinnedRun> {
    for pinned in &resolved.revisions {
      if pinned.revision.is_empty() {
        return Err(
          ManifestError::MissingRevision {
            component: pinned.component.clone(),
          }
          .into(),
        );
      }
      let repo = self.src_dir.join(&pinned.component);
      self.vcs.clean(&repo)?;
      self
        .vcs
        .checkout_detached(&repo, &pinned.revision)
        .with_context(|| format!("Failed to pin {} to {}", pinned.component, pinned.revision))?;
      tracing::info!(component = %pinned.component, revision = %pinned.revision, "pinned");
    }

    Ok(PinnedRun {
      tag: resolved.tag,
      revisions: resolved.revisions,
    })
  }
}
