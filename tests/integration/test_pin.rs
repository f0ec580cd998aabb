//! Tests for the revision pinner

use crate::helpers::*;
use anyhow::Result;
use driver_release::core::config::{ComponentConfig, ReleaseConfig};
use driver_release::core::error::{ManifestError, ReleaseError};
use driver_release::core::pin::RevisionPinner;
use driver_release::core::sync::RepositorySynchronizer;
use driver_release::core::vcs::SystemVcs;
use driver_release::release::latest_tag;
use driver_release::utils::repo_url;
use std::path::Path;

/// Umbrella clone plus synchronized components, the state pinning starts from
fn prepare(remote: &RemoteRoot, src: &Path, config: &ReleaseConfig) -> Result<()> {
  let url = remote.url();
  latest_tag(&SystemVcs, &repo_url(&url, &config.umbrella), &src.join(&config.umbrella))?;
  RepositorySynchronizer::new(&SystemVcs, &url, src, &config.base_branch).synchronize(&config.components)?;
  Ok(())
}

#[test]
fn test_pins_components_to_manifest_revisions() -> Result<()> {
  let remote = RemoteRoot::new()?;
  let pinned = seed_release(&remote, "v-2023.Q3.1", "Update Khronos headers")?;

  // upstream moves on after the tag
  remote.write_file("xgl", "icd/api.cpp", "// newer\n")?;
  let newer = remote.commit("xgl", "Work after the release")?;

  let work = tempfile::tempdir()?;
  let src = work.path().join("amdvlk_src");
  let config = ReleaseConfig::default();
  prepare(&remote, &src, &config)?;
  assert_eq!(rev_parse(&src.join("xgl"), "HEAD")?, newer);

  let run = RevisionPinner::new(&SystemVcs, &src, &config.umbrella, &config.manifest)
    .pin("v-2023.Q3.1", &config.component_names())?;

  assert_eq!(run.tag.name, "v-2023.Q3.1");
  assert_eq!(run.version(), "2023.Q3.1");
  assert_eq!(run.tag.description, "Update Khronos headers");
  for (name, sha) in &pinned {
    assert_eq!(run.revision_of(name), Some(sha.as_str()));
    assert_eq!(&rev_parse(&src.join(name), "HEAD")?, sha);
  }
  assert!(src.join("AMDVLK/LICENSE.txt").exists());
  Ok(())
}

#[test]
fn test_component_missing_from_manifest_aborts() -> Result<()> {
  let remote = RemoteRoot::new()?;
  seed_release(&remote, "v-2023.Q3.1", "Update")?;
  remote.add_repo("gpurt", "dev")?;

  let work = tempfile::tempdir()?;
  let src = work.path().join("amdvlk_src");
  let mut config = ReleaseConfig::default();
  config.components.push(ComponentConfig::new("gpurt"));
  prepare(&remote, &src, &config)?;

  let err = RevisionPinner::new(&SystemVcs, &src, &config.umbrella, &config.manifest)
    .pin("v-2023.Q3.1", &config.component_names())
    .unwrap_err();

  assert!(matches!(
    err,
    ReleaseError::Manifest(ManifestError::MissingRevision { ref component }) if component == "gpurt"
  ));
  Ok(())
}

#[test]
fn test_unknown_tag_fails_checkout() -> Result<()> {
  let remote = RemoteRoot::new()?;
  seed_release(&remote, "v-2023.Q3.1", "Update")?;

  let work = tempfile::tempdir()?;
  let src = work.path().join("amdvlk_src");
  let config = ReleaseConfig::default();
  prepare(&remote, &src, &config)?;

  let result = RevisionPinner::new(&SystemVcs, &src, &config.umbrella, &config.manifest)
    .pin("v-1999.Q1.1", &config.component_names());

  assert!(matches!(result, Err(ReleaseError::Git(_))));
  Ok(())
}
