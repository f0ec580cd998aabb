//! RHEL package assembly (`rpmbuild -bb`)

use crate::core::config::{Arch, PackageConfig};
use crate::core::error::{ConfigError, LookupError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::exec::run_tool;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const SPEC_FILE: &str = "amdvlk.spec";

/// `<name>-<version>-el.x86_64`
pub fn package_stem(package: &PackageConfig, version: &str) -> String {
  format!("{}-{}-el.x86_64", package.name, version)
}

pub fn rpm_file_name(package: &PackageConfig, version: &str) -> String {
  format!("{}.rpm", package_stem(package, version))
}

pub fn render_spec(package: &PackageConfig, version: &str) -> String {
  let arch = Arch::Amd64;
  format!(
    "Name: {name}\n\
     Version: {version}\n\
     Release: el\n\
     Summary: AMD Open Source Driver for Vulkan\n\
     URL: {homepage}\n\
     License: MIT\n\
     Group: System Environment/Libraries\n\
     Vendor: {maintainer}\n\
     Buildarch: x86_64\n\
     \n\
     %description\n\
     %prep\n\
     %build\n\
     %pre\n\
     %post\n\
     %preun\n\
     %postun\n\
     %files\n\
     /usr/lib64/{icd}\n\
     /etc/vulkan/icd.d/{json}\n\
     /usr/share/doc/{name}/copyright\n\
     /usr/share/doc/{name}/changelog\n\
     %changelog\n",
    name = package.name,
    version = version,
    homepage = package.homepage,
    maintainer = package.maintainer,
    icd = arch.icd_name(),
    json = arch.icd_json_name(),
  )
}

/// `package.rpmbuild_dir`, else `$HOME/rpmbuild`
pub fn rpmbuild_dir(package: &PackageConfig) -> ReleaseResult<PathBuf> {
  if let Some(dir) = &package.rpmbuild_dir {
    return Ok(dir.clone());
  }
  std::env::var_os("HOME")
    .map(|home| PathBuf::from(home).join("rpmbuild"))
    .ok_or_else(|| {
      ReleaseError::Config(ConfigError::MissingOption {
        option: "package.rpmbuild_dir (HOME is unset)".to_string(),
      })
    })
}

/// Inputs for the RPM
pub struct RpmSources {
  pub icd: PathBuf,
  pub icd_json: PathBuf,
  pub changelog: PathBuf,
  pub copyright: PathBuf,
}

impl RpmSources {
  pub fn locate(src_dir: &Path, umbrella: &str, pkg_shared_dir: &Path) -> Self {
    let arch = Arch::Amd64;
    Self {
      icd: src_dir.join("xgl").join(arch.build_dir()).join("icd").join(arch.icd_name()),
      icd_json: src_dir.join(umbrella).join("json").join("Redhat").join(arch.icd_json_name()),
      changelog: pkg_shared_dir.join("changelog"),
      copyright: pkg_shared_dir.join("copyright"),
    }
  }
}

/// Recreate `rpmbuild_dir`, write the spec and lay out the buildroot
///
/// Returns the staged ICD path so it can be stripped.
pub fn stage(rpmbuild_dir: &Path, sources: &RpmSources, package: &PackageConfig, version: &str) -> ReleaseResult<PathBuf> {
  if rpmbuild_dir.exists() {
    fs::remove_dir_all(rpmbuild_dir).with_context(|| format!("Failed to clear {}", rpmbuild_dir.display()))?;
  }
  let spec_dir = rpmbuild_dir.join("SPEC");
  fs::create_dir_all(&spec_dir)?;
  fs::write(spec_dir.join(SPEC_FILE), render_spec(package, version))?;

  let root = rpmbuild_dir.join("BUILDROOT").join(package_stem(package, version));
  let doc_dir = root.join("usr/share/doc").join(&package.name);
  let icd_dir = root.join("usr/lib64");
  let json_dir = root.join("etc/vulkan/icd.d");
  for dir in [&icd_dir, &doc_dir, &json_dir, &root.join("etc/vulkan/implicit_layer.d")] {
    fs::create_dir_all(dir)?;
  }

  let icd = icd_dir.join(Arch::Amd64.icd_name());
  let copies = [
    (&sources.icd, icd.clone()),
    (&sources.icd_json, json_dir.join(Arch::Amd64.icd_json_name())),
    (&sources.changelog, doc_dir.join("changelog")),
    (&sources.copyright, doc_dir.join("copyright")),
  ];
  for (source, dest) in copies {
    if !source.exists() {
      return Err(LookupError::ArtifactMissing { path: source.clone() }.into());
    }
    fs::copy(source, &dest).with_context(|| format!("Failed to copy {}", source.display()))?;
  }

  Ok(icd)
}

/// Stage, strip, run rpmbuild and copy the result to `<work_dir>/<stem>.rpm`
pub fn make_rpm(work_dir: &Path, sources: &RpmSources, package: &PackageConfig, version: &str) -> ReleaseResult<PathBuf> {
  let rpmbuild = rpmbuild_dir(package)?;
  let icd = stage(&rpmbuild, sources, package, version)?;

  run_tool(Command::new("strip").arg(&icd))?;
  run_tool(Command::new("rpmbuild").current_dir(rpmbuild.join("SPEC")).args(["-bb", SPEC_FILE]))?;

  let name = rpm_file_name(package, version);
  let built = rpmbuild.join("RPMS").join("x86_64").join(&name);
  if !built.exists() {
    return Err(LookupError::ArtifactMissing { path: built }.into());
  }
  let dest = work_dir.join(&name);
  fs::copy(&built, &dest).with_context(|| format!("Failed to copy {}", built.display()))?;
  println!("   Built {}", dest.display());
  Ok(dest)
}
