//! Debian package assembly (`dpkg -b`)

use crate::core::config::{Arch, PackageConfig};
use crate::core::error::{LookupError, ReleaseResult, ResultExt};
use crate::core::exec::{run_tool, run_tool_stdout};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEPENDS: &str = "libc6 (>= 2.17), libgcc1 (>= 1:3.4), libstdc++6 (>= 5.2)";
pub const DOC_DIR: &str = "usr/share/doc/amdvlk";
pub const ICD_JSON_DIR: &str = "etc/vulkan/icd.d";

pub fn deb_file_name(package: &PackageConfig, version: &str, arch: Arch) -> String {
  format!("{}_{}_{}.deb", package.name, version, arch.as_str())
}

/// `DEBIAN/control` contents
pub fn render_control(package: &PackageConfig, version: &str, arch: Arch) -> String {
  format!(
    "Package: {name}\n\
     Version: {version}\n\
     Architecture: {arch}\n\
     Maintainer: {maintainer}\n\
     Depends: {depends}\n\
     Conflicts: {name}\n\
     Replaces: {name}\n\
     Section: libs\n\
     Priority: optional\n\
     Multi-Arch: same\n\
     Homepage: {homepage}\n\
     Description: AMD Open Source Driver for Vulkan\n",
    name = package.name,
    version = version,
    arch = arch.as_str(),
    maintainer = package.maintainer,
    depends = DEPENDS,
    homepage = package.homepage,
  )
}

/// Inputs for one Debian package
pub struct DebSources<'a> {
  pub icd: PathBuf,
  pub icd_json: PathBuf,
  pub pkg_shared_dir: &'a Path,
}

impl<'a> DebSources<'a> {
  /// Standard locations inside the source tree
  pub fn locate(src_dir: &Path, umbrella: &str, pkg_shared_dir: &'a Path, arch: Arch) -> Self {
    Self {
      icd: src_dir.join("xgl").join(arch.build_dir()).join("icd").join(arch.icd_name()),
      icd_json: src_dir.join(umbrella).join("json").join("Ubuntu").join(arch.icd_json_name()),
      pkg_shared_dir,
    }
  }
}

/// Lay out the package tree under `pkg_dir` (recreated from scratch)
///
/// Returns the installed paths relative to `pkg_dir`, in md5sums order.
pub fn stage(pkg_dir: &Path, sources: &DebSources<'_>, package: &PackageConfig, version: &str, arch: Arch) -> ReleaseResult<Vec<String>> {
  if pkg_dir.exists() {
    fs::remove_dir_all(pkg_dir).with_context(|| format!("Failed to clear {}", pkg_dir.display()))?;
  }

  let lib_dir = format!("usr/lib/{}", arch.lib_triplet());
  let installs = [
    (sources.icd.clone(), format!("{}/{}", lib_dir, arch.icd_name())),
    (sources.icd_json.clone(), format!("{}/{}", ICD_JSON_DIR, arch.icd_json_name())),
    (
      sources.pkg_shared_dir.join("changelog.Debian.gz"),
      format!("{}/changelog.Debian.gz", DOC_DIR),
    ),
    (sources.pkg_shared_dir.join("copyright"), format!("{}/copyright", DOC_DIR)),
  ];

  let mut installed = Vec::with_capacity(installs.len());
  for (source, relative) in installs {
    if !source.exists() {
      return Err(LookupError::ArtifactMissing { path: source }.into());
    }
    let dest = pkg_dir.join(&relative);
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::copy(&source, &dest).with_context(|| format!("Failed to copy {}", source.display()))?;
    installed.push(relative);
  }

  let debian = pkg_dir.join("DEBIAN");
  fs::create_dir_all(&debian)?;
  fs::write(debian.join("control"), render_control(package, version, arch))?;

  Ok(installed)
}

/// Stage, checksum and build `<work_dir>/<name>_<version>_<arch>.deb`
pub fn make_deb(
  work_dir: &Path,
  pkg_dir: &Path,
  sources: &DebSources<'_>,
  package: &PackageConfig,
  version: &str,
  arch: Arch,
) -> ReleaseResult<PathBuf> {
  let installed = stage(pkg_dir, sources, package, version, arch)?;

  let md5sums = run_tool_stdout(Command::new("md5sum").current_dir(pkg_dir).args(&installed))?;
  fs::write(pkg_dir.join("DEBIAN").join("md5sums"), format!("{}\n", md5sums))?;

  let deb = work_dir.join(deb_file_name(package, version, arch));
  run_tool(Command::new("dpkg").arg("-b").arg(pkg_dir).arg(&deb))?;
  println!("   Built {}", deb.display());
  Ok(deb)
}
