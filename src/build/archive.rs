//! Compression and archiving
//!
//! Runs in-process (`flate2`, `zip`) rather than shelling out to gzip/zip.

use crate::core::config::Arch;
use crate::core::error::{LookupError, ReleaseResult, ResultExt};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub trait Archiver {
  /// gzip `src` into `dest` at maximum compression
  fn gzip(&self, src: &Path, dest: &Path) -> ReleaseResult<()>;

  /// Zip the directory `dir` into `dest`; entries are prefixed with the
  /// directory's own name
  fn zip_dir(&self, dir: &Path, dest: &Path) -> ReleaseResult<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FileArchiver;

impl Archiver for FileArchiver {
  fn gzip(&self, src: &Path, dest: &Path) -> ReleaseResult<()> {
    let mut input = File::open(src).with_context(|| format!("Failed to open {}", src.display()))?;
    let output = File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::best());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;
    Ok(())
  }

  fn zip_dir(&self, dir: &Path, dest: &Path) -> ReleaseResult<()> {
    let prefix = dir
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_default();
    let file = File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let mut zip = ZipWriter::new(file);

    zip.add_directory(format!("{}/", prefix), SimpleFileOptions::default())?;

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
      .map(|entry| entry.map(|e| e.path()))
      .collect::<Result<_, _>>()?;
    entries.sort();

    for path in entries.iter().filter(|p| p.is_file()) {
      let name = format!("{}/{}", prefix, path.file_name().unwrap_or_default().to_string_lossy());
      zip.start_file(name, file_options(path)?)?;
      io::copy(&mut File::open(path)?, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
  }
}

#[cfg(unix)]
fn file_options(path: &Path) -> ReleaseResult<SimpleFileOptions> {
  use std::os::unix::fs::PermissionsExt;
  let mode = fs::metadata(path)?.permissions().mode();
  Ok(SimpleFileOptions::default().unix_permissions(mode))
}

#[cfg(not(unix))]
fn file_options(_path: &Path) -> ReleaseResult<SimpleFileOptions> {
  Ok(SimpleFileOptions::default())
}

pub fn tools_archive_name(arch: Arch) -> String {
  format!("amdllpc_{}.zip", arch.as_str())
}

/// Bundle `amdllpc` and `spvgen.so` from the xgl build tree into
/// `<work_dir>/amdllpc_<arch>.zip`
pub fn archive_tools(work_dir: &Path, xgl_dir: &Path, arch: Arch, archiver: &dyn Archiver) -> ReleaseResult<PathBuf> {
  let build = xgl_dir.join(arch.build_dir());
  let sources = [
    build.join("compiler").join("llpc").join("amdllpc"),
    build.join("spvgen").join("spvgen.so"),
  ];

  let tools_dir = work_dir.join(format!("amdllpc_{}", arch.as_str()));
  if tools_dir.exists() {
    fs::remove_dir_all(&tools_dir)?;
  }
  fs::create_dir_all(&tools_dir)?;

  for source in &sources {
    if !source.exists() {
      return Err(LookupError::ArtifactMissing { path: source.clone() }.into());
    }
    let name = source.file_name().unwrap_or_default();
    fs::copy(source, tools_dir.join(name)).with_context(|| format!("Failed to copy {}", source.display()))?;
  }

  let dest = work_dir.join(tools_archive_name(arch));
  archiver.zip_dir(&tools_dir, &dest)?;
  println!("   Archived {}", dest.display());
  Ok(dest)
}
