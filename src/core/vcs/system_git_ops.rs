//! Additional operations for SystemGit (cleaning, checkouts, tags)

use super::system_git::SystemGit;
use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};

impl SystemGit {
  /// Remove untracked and ignored files, then reset tracked modifications
  ///
  /// Equivalent to `git clean -xdf && git reset --hard`. Leaves HEAD where it is.
  pub fn clean_all(&self) -> ReleaseResult<()> {
    self.run(&["clean", "-xdf"], "git clean -xdf")?;
    self.run(&["reset", "--hard", "--quiet"], "git reset --hard")?;
    Ok(())
  }

  /// Checkout a branch
  ///
  /// A branch that only exists on `origin` is created locally with upstream
  /// tracking (git's checkout DWIM).
  pub fn checkout_branch(&self, branch_name: &str) -> ReleaseResult<()> {
    let output = self
      .git_cmd()
      .args(["checkout", branch_name])
      .output()
      .context("Failed to checkout branch")?;

    if !output.status.success() {
      return Err(ReleaseError::Git(GitError::CheckoutFailed {
        repo: self.repo_path.clone(),
        reference: branch_name.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(())
  }

  /// Fast-forward the current branch to `remote/branch`
  ///
  /// Refuses to create merge commits: diverged history is an error.
  pub fn pull_fast_forward(&self, remote_name: &str, branch: &str) -> ReleaseResult<()> {
    let command = format!("git pull --ff-only {} {}", remote_name, branch);
    self.run(&["pull", "--ff-only", "--quiet", remote_name, branch], &command)?;
    Ok(())
  }

  /// Check out a tag or commit with a detached HEAD
  pub fn checkout_detached(&self, reference: &str) -> ReleaseResult<()> {
    let output = self
      .git_cmd()
      .args(["checkout", "--detach", reference])
      .output()
      .context("Failed to checkout reference")?;

    if !output.status.success() {
      return Err(ReleaseError::Git(GitError::CheckoutFailed {
        repo: self.repo_path.clone(),
        reference: reference.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(())
  }

  /// List tags in `git tag` order (refname order)
  pub fn list_tags(&self) -> ReleaseResult<Vec<String>> {
    let stdout = self.run(&["tag"], "git tag")?;
    Ok(parse_lines(&stdout))
  }

  /// Full commit message (subject and body) of a reference
  pub fn commit_message(&self, reference: &str) -> ReleaseResult<String> {
    let command = format!("git log -1 --format=%B {}", reference);
    let stdout = self.run(&["log", "-1", "--format=%B", reference], &command)?;
    Ok(stdout.trim_end().to_string())
  }

  fn run(&self, args: &[&str], command: &str) -> ReleaseResult<String> {
    tracing::debug!(repo = %self.repo_path.display(), %command, "git");

    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to run {}", command))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::Git(GitError::CommandFailed {
        repo: self.repo_path.clone(),
        command: command.to_string(),
        stderr: stderr.trim().to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }
}

/// Non-empty trimmed lines, in order
fn parse_lines(stdout: &str) -> Vec<String> {
  stdout
    .lines()
    .map(|s| s.trim())
    .filter(|s| !s.is_empty())
    .map(String::from)
    .collect()
}
