//! Utility functions for repository locations

use std::path::Path;

/// Check if a path is a local filesystem path (not a remote URL)
///
/// Returns true for:
/// - Absolute paths on Unix: /path/to/repo
/// - Relative paths: ./path or ../path
/// - `file://` URLs
///
/// Returns false for:
/// - SSH URLs: git@github.com:user/repo.git
/// - HTTPS URLs: <https://github.com/user/repo.git>
pub fn is_local_path(path: &str) -> bool {
  if path.starts_with("./") || path.starts_with("../") || path.starts_with("file://") {
    return true;
  }

  if path.starts_with('/') {
    // Make sure it's not part of a URL pattern
    if !path.contains("://") && !path.contains('@') {
      return true;
    }
  }

  if path.contains("://") || path.contains('@') {
    return false;
  }

  Path::new(path).is_absolute()
}

/// Join a repository root and a repository name
///
/// Both `https://github.com/GPUOpen-Drivers` and `https://github.com/GPUOpen-Drivers/`
/// yield `https://github.com/GPUOpen-Drivers/<name>`. Local directories are joined
/// as paths.
pub fn repo_url(root: &str, name: &str) -> String {
  if is_local_path(root) && !root.starts_with("file://") {
    return Path::new(root).join(name).to_string_lossy().to_string();
  }
  format!("{}/{}", root.trim_end_matches('/'), name)
}
