//! Release context - build once, pass everywhere
//!
//! `ReleaseContext` holds everything that is fixed for the lifetime of a run:
//! the validated command-line options, the loaded configuration and the
//! directory layout derived from the work directory. It is immutable. State
//! that changes while a run progresses (the chosen tag, the pinned revisions)
//! is carried by the values each stage returns, see `core::pin::PinnedRun`.
//!
//! ```text
//! <work_dir>/
//!   amdvlk_src/<umbrella>     umbrella checkout (fresh clone per run)
//!   amdvlk_src/<component>    one clone per tracked component
//!   package/                  Debian staging tree
//!   pkgShared/                changelog + copyright shared by all packages
//!   *.deb *.rpm *.zip         artifacts
//! ```

use crate::core::config::{Mode, ReleaseConfig, ValidatedOptions};
use crate::utils::repo_url;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ReleaseContext {
  /// Work directory (absolute when built from the CLI)
  pub work_dir: PathBuf,

  /// Root URL (or local directory) component repositories are cloned from
  pub target_repo: String,

  pub access_token: String,

  pub mode: Mode,

  pub config: ReleaseConfig,
}

impl ReleaseContext {
  pub fn new(options: ValidatedOptions, config: ReleaseConfig) -> Self {
    Self {
      work_dir: options.work_dir,
      target_repo: options.target_repo,
      access_token: options.access_token,
      mode: options.mode,
      config,
    }
  }

  pub fn work_dir(&self) -> &Path {
    &self.work_dir
  }

  /// Directory holding every cloned repository
  pub fn src_dir(&self) -> PathBuf {
    self.work_dir.join("amdvlk_src")
  }

  pub fn umbrella_dir(&self) -> PathBuf {
    self.src_dir().join(&self.config.umbrella)
  }

  pub fn component_dir(&self, name: &str) -> PathBuf {
    self.src_dir().join(name)
  }

  pub fn pkg_dir(&self) -> PathBuf {
    self.work_dir.join("package")
  }

  pub fn pkg_shared_dir(&self) -> PathBuf {
    self.work_dir.join("pkgShared")
  }

  pub fn umbrella_url(&self) -> String {
    repo_url(&self.target_repo, &self.config.umbrella)
  }
}
