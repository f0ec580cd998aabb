//! Tests for latest-tag discovery

use crate::helpers::*;
use anyhow::Result;
use driver_release::core::vcs::SystemVcs;
use driver_release::release::{Decision, ReleaseSet, latest_tag};
use driver_release::utils::repo_url;

#[test]
fn test_latest_tag_is_last_listed() -> Result<()> {
  let remote = RemoteRoot::new()?;
  remote.add_repo("AMDVLK", "dev")?;
  remote.tag("AMDVLK", "v1.0")?;
  remote.commit("AMDVLK", "Second release")?;
  remote.tag("AMDVLK", "v1.1")?;

  let work = tempfile::tempdir()?;
  let dest = work.path().join("amdvlk_src/AMDVLK");
  let latest = latest_tag(&SystemVcs, &repo_url(&remote.url(), "AMDVLK"), &dest)?;

  assert_eq!(latest.as_deref(), Some("v1.1"));

  let released: ReleaseSet = ["v1.0".to_string(), "v1.1".to_string()].into_iter().collect();
  assert_eq!(
    Decision::decide(latest.as_deref(), &released),
    Decision::AlreadyReleased("v1.1".to_string())
  );
  Ok(())
}

#[test]
fn test_listing_order_is_refname_order() -> Result<()> {
  let remote = RemoteRoot::new()?;
  remote.add_repo("AMDVLK", "dev")?;
  remote.tag("AMDVLK", "v9")?;
  remote.commit("AMDVLK", "Later release")?;
  remote.tag("AMDVLK", "v10")?;

  let work = tempfile::tempdir()?;
  let dest = work.path().join("AMDVLK");
  let latest = latest_tag(&SystemVcs, &repo_url(&remote.url(), "AMDVLK"), &dest)?;

  // "v10" sorts before "v9"; the newer tag is not the one picked
  assert_eq!(latest.as_deref(), Some("v9"));
  Ok(())
}

#[test]
fn test_stale_checkout_is_replaced() -> Result<()> {
  let remote = RemoteRoot::new()?;
  remote.add_repo("AMDVLK", "dev")?;
  remote.tag("AMDVLK", "v-2023.Q3.1")?;

  let work = tempfile::tempdir()?;
  let dest = work.path().join("AMDVLK");
  std::fs::create_dir_all(&dest)?;
  std::fs::write(dest.join("leftover.txt"), "stale")?;

  let latest = latest_tag(&SystemVcs, &repo_url(&remote.url(), "AMDVLK"), &dest)?;

  assert_eq!(latest.as_deref(), Some("v-2023.Q3.1"));
  assert!(!dest.join("leftover.txt").exists());
  assert!(dest.join("README.md").exists());
  Ok(())
}

#[test]
fn test_untagged_umbrella() -> Result<()> {
  let remote = RemoteRoot::new()?;
  remote.add_repo("AMDVLK", "dev")?;

  let work = tempfile::tempdir()?;
  let latest = latest_tag(&SystemVcs, &repo_url(&remote.url(), "AMDVLK"), &work.path().join("AMDVLK"))?;

  assert_eq!(latest, None);
  assert_eq!(Decision::decide(None, &ReleaseSet::default()), Decision::NoTags);
  Ok(())
}
