pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use std::path::Path;

/// Version-control operations the release flow depends on
///
/// Every method takes the repository directory explicitly so one value can
/// drive all component clones. `SystemVcs` shells out to git; tests substitute
/// in-memory fakes.
pub trait VersionControl {
  /// Clone `url` into `dest` (which must not exist)
  fn clone_repo(&self, url: &str, dest: &Path) -> ReleaseResult<()>;

  /// Drop untracked and ignored files and reset tracked modifications
  fn clean(&self, repo: &Path) -> ReleaseResult<()>;

  /// Check out a local or remote-tracking branch
  fn checkout_branch(&self, repo: &Path, branch: &str) -> ReleaseResult<()>;

  /// Fast-forward the current branch to the remote tip of `branch`
  fn pull_fast_forward(&self, repo: &Path, branch: &str) -> ReleaseResult<()>;

  /// Check out a tag or commit with a detached HEAD
  fn checkout_detached(&self, repo: &Path, reference: &str) -> ReleaseResult<()>;

  /// Tags in `git tag` listing order
  fn list_tags(&self, repo: &Path) -> ReleaseResult<Vec<String>>;

  /// Full commit message of `reference`
  fn commit_message(&self, repo: &Path, reference: &str) -> ReleaseResult<String>;

  fn head_commit(&self, repo: &Path) -> ReleaseResult<String>;
}

/// `VersionControl` backed by the system git binary
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemVcs;

impl VersionControl for SystemVcs {
  fn clone_repo(&self, url: &str, dest: &Path) -> ReleaseResult<()> {
    SystemGit::clone_from(url, dest).map(|_| ())
  }

  fn clean(&self, repo: &Path) -> ReleaseResult<()> {
    SystemGit::open(repo)?.clean_all()
  }

  fn checkout_branch(&self, repo: &Path, branch: &str) -> ReleaseResult<()> {
    SystemGit::open(repo)?.checkout_branch(branch)
  }

  fn pull_fast_forward(&self, repo: &Path, branch: &str) -> ReleaseResult<()> {
    SystemGit::open(repo)?.pull_fast_forward("origin", branch)
  }

  fn checkout_detached(&self, repo: &Path, reference: &str) -> ReleaseResult<()> {
    SystemGit::open(repo)?.checkout_detached(reference)
  }

  fn list_tags(&self, repo: &Path) -> ReleaseResult<Vec<String>> {
    SystemGit::open(repo)?.list_tags()
  }

  fn commit_message(&self, repo: &Path, reference: &str) -> ReleaseResult<String> {
    SystemGit::open(repo)?.commit_message(reference)
  }

  fn head_commit(&self, repo: &Path) -> ReleaseResult<String> {
    SystemGit::open(repo)?.head_commit()
  }
}
