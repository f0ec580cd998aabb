//! System git backend
//!
//! Uses the git porcelain for every operation. Commands inherit the caller's
//! environment (proxies, SSH agent, CA bundle) so remote clones work wherever
//! plain git does; behaviour that matters to a release is pinned with `-c`.

use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// One `git rev-parse` call confirms `path` is inside a work tree.
  pub fn open(path: &Path) -> ReleaseResult<Self> {
    let output = base_cmd()
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") || !path.exists() {
        return Err(ReleaseError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ReleaseError::message(format!("Failed to open git repository: {}", stderr)));
    }

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Clone `url` into `dest` and open the result
  pub fn clone_from(url: &str, dest: &Path) -> ReleaseResult<Self> {
    tracing::debug!(%url, dest = %dest.display(), "git clone");

    let output = base_cmd()
      .arg("clone")
      .arg(url)
      .arg(dest)
      .output()
      .context("Failed to execute git clone")?;

    if !output.status.success() {
      return Err(ReleaseError::Git(GitError::CloneFailed {
        url: url.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Self::open(dest)
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> ReleaseResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "HEAD"])
      .output()
      .context("Failed to get HEAD commit")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::Git(GitError::CommandFailed {
        repo: self.repo_path.clone(),
        command: "git rev-parse HEAD".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Git command rooted at the repository (`git -C <repo>`)
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = base_cmd();
    cmd.arg("-C").arg(&self.repo_path);
    cmd
  }
}

fn base_cmd() -> Command {
  let mut cmd = Command::new("git");

  // Unattended runs must fail instead of waiting on a credential prompt
  cmd.env("GIT_TERMINAL_PROMPT", "0");

  // Force safe behavior (override user config)
  cmd.arg("-c").arg("protocol.version=2");
  cmd.arg("-c").arg("advice.detachedHead=false");
  cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

  cmd
}
