//! Changelog and copyright files shared by every package

use crate::build::archive::Archiver;
use crate::core::config::PackageConfig;
use crate::core::error::{LookupError, ReleaseResult, ResultExt};
use crate::core::pin::TagInfo;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

pub const LICENSE_FILE: &str = "LICENSE.txt";

/// Files under `pkgShared/`
#[derive(Debug, Clone)]
pub struct SharedDocs {
  pub changelog: PathBuf,
  pub changelog_gz: PathBuf,
  pub copyright: PathBuf,
}

/// Debian-style changelog entry for a tag
pub fn render_changelog(package: &PackageConfig, tag: &TagInfo, date: DateTime<Utc>) -> String {
  let mut out = format!("{} ({}) unstable; urgency=medium\n\n", package.name, tag.version);
  let mut wrote_line = false;
  for line in tag.description.lines().map(str::trim).filter(|l| !l.is_empty()) {
    out.push_str(&format!("  * {}\n", line));
    wrote_line = true;
  }
  if !wrote_line {
    out.push_str(&format!("  * Release {}\n", tag.name));
  }
  out.push_str(&format!("\n -- {}  {}\n", package.maintainer, date.to_rfc2822()));
  out
}

/// Write `changelog`, `changelog.Debian.gz` and `copyright` into `pkg_shared_dir`
///
/// The copyright file is the umbrella repository's license at the pinned tag.
pub fn write_shared_docs(
  pkg_shared_dir: &Path,
  umbrella_dir: &Path,
  package: &PackageConfig,
  tag: &TagInfo,
  archiver: &dyn Archiver,
) -> ReleaseResult<SharedDocs> {
  fs::create_dir_all(pkg_shared_dir)
    .with_context(|| format!("Failed to create {}", pkg_shared_dir.display()))?;

  let changelog = pkg_shared_dir.join("changelog");
  fs::write(&changelog, render_changelog(package, tag, Utc::now()))
    .with_context(|| format!("Failed to write {}", changelog.display()))?;

  let changelog_gz = pkg_shared_dir.join("changelog.Debian.gz");
  archiver.gzip(&changelog, &changelog_gz)?;

  let license = umbrella_dir.join(LICENSE_FILE);
  if !license.exists() {
    return Err(LookupError::ArtifactMissing { path: license }.into());
  }
  let copyright = pkg_shared_dir.join("copyright");
  fs::copy(&license, &copyright).with_context(|| format!("Failed to copy {}", license.display()))?;

  Ok(SharedDocs {
    changelog,
    changelog_gz,
    copyright,
  })
}
