//! SHA256SUMS for release artifacts

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

pub const CHECKSUM_FILE: &str = "SHA256SUMS";

pub fn sha256_file(path: &Path) -> ReleaseResult<String> {
  let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
  let mut hasher = Sha256::new();
  io::copy(&mut file, &mut hasher)?;
  Ok(format!("{:x}", hasher.finalize()))
}

/// Write `<dir>/SHA256SUMS` in `sha256sum` format, one line per artifact
pub fn write_checksums(dir: &Path, artifacts: &[PathBuf]) -> ReleaseResult<PathBuf> {
  let mut content = String::new();
  for artifact in artifacts {
    let name = artifact
      .file_name()
      .ok_or_else(|| ReleaseError::message(format!("Not a file: {}", artifact.display())))?;
    content.push_str(&format!("{}  {}\n", sha256_file(artifact)?, name.to_string_lossy()));
  }

  let path = dir.join(CHECKSUM_FILE);
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}
