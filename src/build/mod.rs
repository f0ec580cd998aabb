//! Building the driver and packaging it
//!
//! - **distro**: which package format the host produces
//! - **cmake**: configure + ninja for one architecture
//! - **changelog**: changelog/copyright shared by every package
//! - **deb** / **rpm**: package assembly via dpkg and rpmbuild
//! - **archive**: gzip and zip, plus the amdllpc tool archives
//!
//! The orchestrator only talks to `PackageBuilder` and `Archiver`, so a run
//! can be exercised end to end without a compiler toolchain installed.

pub mod archive;
pub mod changelog;
pub mod cmake;
pub mod deb;
pub mod distro;
pub mod rpm;

pub use archive::{Archiver, FileArchiver};
pub use distro::Distribution;

use crate::core::config::Arch;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use std::path::PathBuf;

/// Build and package capability
///
/// Packaging reads the shared docs from `pkgShared/`, so the orchestrator
/// writes those before calling `make_deb` or `make_rpm`.
pub trait PackageBuilder {
  fn distribution(&self) -> ReleaseResult<Distribution>;

  /// Compile the driver and tool targets for `arch`
  fn build_driver(&self, arch: Arch) -> ReleaseResult<()>;

  /// Returns the path of the `.deb` in the work directory
  fn make_deb(&self, version: &str, arch: Arch) -> ReleaseResult<PathBuf>;

  /// Returns the path of the `.rpm` in the work directory
  fn make_rpm(&self, version: &str) -> ReleaseResult<PathBuf>;
}

/// Runs the real tools (lsb_release, cmake, ninja, md5sum, dpkg, strip, rpmbuild)
pub struct SystemPackager<'a> {
  ctx: &'a ReleaseContext,
}

impl<'a> SystemPackager<'a> {
  pub fn new(ctx: &'a ReleaseContext) -> Self {
    Self { ctx }
  }
}

impl PackageBuilder for SystemPackager<'_> {
  fn distribution(&self) -> ReleaseResult<Distribution> {
    Distribution::detect()
  }

  fn build_driver(&self, arch: Arch) -> ReleaseResult<()> {
    cmake::build_driver(&self.ctx.component_dir("xgl"), arch)
  }

  fn make_deb(&self, version: &str, arch: Arch) -> ReleaseResult<PathBuf> {
    let shared = self.ctx.pkg_shared_dir();
    let sources = deb::DebSources::locate(&self.ctx.src_dir(), &self.ctx.config.umbrella, &shared, arch);
    deb::make_deb(
      self.ctx.work_dir(),
      &self.ctx.pkg_dir(),
      &sources,
      &self.ctx.config.package,
      version,
      arch,
    )
  }

  fn make_rpm(&self, version: &str) -> ReleaseResult<PathBuf> {
    let sources = rpm::RpmSources::locate(
      &self.ctx.src_dir(),
      &self.ctx.config.umbrella,
      &self.ctx.pkg_shared_dir(),
    );
    rpm::make_rpm(self.ctx.work_dir(), &sources, &self.ctx.config.package, version)
  }
}
