//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A directory of bare repositories standing in for the hosting service
///
/// Every repository `<name>` is a bare repo at `<path>/<name>`, so the
/// directory can be used directly as the target repository root. Commits
/// are made in a scratch clone and pushed.
pub struct RemoteRoot {
  _root: TempDir,
  pub path: PathBuf,
  scratch: PathBuf,
}

impl RemoteRoot {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("remotes");
    let scratch = root.path().join("scratch");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&scratch)?;
    Ok(Self {
      _root: root,
      path,
      scratch,
    })
  }

  /// Root as a string, for `--target-repo`
  pub fn url(&self) -> String {
    self.path.display().to_string()
  }

  /// Create repository `name` whose default branch is `branch`, with one commit
  ///
  /// Returns the commit SHA.
  pub fn add_repo(&self, name: &str, branch: &str) -> Result<String> {
    let bare = self.path.join(name);
    git(
      &self.path,
      &["init", "--bare", &format!("--initial-branch={}", branch), name],
    )?;

    let work = self.scratch.join(name);
    std::fs::create_dir_all(&work)?;
    git(&work, &["init", &format!("--initial-branch={}", branch)])?;
    git(&work, &["config", "user.name", "Test User"])?;
    git(&work, &["config", "user.email", "test@example.com"])?;
    git(&work, &["remote", "add", "origin", &bare.display().to_string()])?;

    std::fs::write(work.join("README.md"), format!("# {}\n", name))?;
    self.commit(name, "Initial commit")
  }

  /// Write a file in the scratch clone of `name`
  pub fn write_file(&self, name: &str, file: &str, content: &str) -> Result<()> {
    let path = self.scratch.join(name).join(file);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
  }

  /// Commit everything in the scratch clone of `name` and push the branch
  pub fn commit(&self, name: &str, message: &str) -> Result<String> {
    let work = self.scratch.join(name);
    git(&work, &["add", "."])?;
    git(&work, &["commit", "--allow-empty", "-m", message])?;
    git(&work, &["push", "--quiet", "origin", "HEAD"])?;
    rev_parse(&work, "HEAD")
  }

  /// Lightweight tag at the current commit of `name`, pushed
  pub fn tag(&self, name: &str, tag: &str) -> Result<()> {
    let work = self.scratch.join(name);
    git(&work, &["tag", tag])?;
    git(&work, &["push", "--quiet", "origin", tag])?;
    Ok(())
  }

  /// SHA of `reference` in the bare repository `name`
  pub fn rev_parse(&self, name: &str, reference: &str) -> Result<String> {
    rev_parse(&self.path.join(name), reference)
  }
}

/// The stock component set with their tracking branches for base `dev`
pub const COMPONENTS: [(&str, &str); 7] = [
  ("xgl", "dev"),
  ("pal", "dev"),
  ("llpc", "dev"),
  ("spvgen", "dev"),
  ("llvm-project", "amd-gfx-gpuopen-dev"),
  ("MetroHash", "amd-master"),
  ("CWPack", "amd-master"),
];

/// Manifest recording `revisions` as `GPUOpen-Drivers/<name>` projects
pub fn manifest_xml(revisions: &[(&str, &str)]) -> String {
  let mut xml = String::from(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<manifest>\n  <remote name=\"origin\" fetch=\"https://github.com/GPUOpen-Drivers/\"/>\n  <default revision=\"dev\" remote=\"origin\"/>\n",
  );
  for (name, revision) in revisions {
    xml.push_str(&format!(
      "  <project name=\"GPUOpen-Drivers/{}\" path=\"drivers/{}\" revision=\"{}\"/>\n",
      name, name, revision
    ));
  }
  xml.push_str("</manifest>\n");
  xml
}

/// Every component plus an `AMDVLK` umbrella whose tag `tag` pins the
/// components' initial commits
///
/// Returns the pinned `(component, sha)` pairs.
pub fn seed_release(remote: &RemoteRoot, tag: &str, description: &str) -> Result<Vec<(String, String)>> {
  let mut pinned = Vec::new();
  for (name, branch) in COMPONENTS {
    let sha = remote.add_repo(name, branch)?;
    pinned.push((name.to_string(), sha));
  }

  let revisions: Vec<(&str, &str)> = pinned.iter().map(|(n, s)| (n.as_str(), s.as_str())).collect();
  remote.add_repo("AMDVLK", "dev")?;
  remote.write_file("AMDVLK", "default.xml", &manifest_xml(&revisions))?;
  remote.write_file("AMDVLK", "LICENSE.txt", "MIT License\n")?;
  remote.commit("AMDVLK", description)?;
  remote.tag("AMDVLK", tag)?;

  Ok(pinned)
}

pub fn rev_parse(repo: &Path, reference: &str) -> Result<String> {
  let output = git(repo, &["rev-parse", reference])?;
  Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the driver-release binary without a token in the environment
pub fn run_driver_release(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_driver-release");

  Command::new(bin)
    .current_dir(cwd)
    .env_remove("GITHUB_TOKEN")
    .env_remove("RUST_LOG")
    .args(args)
    .output()
    .context("Failed to run driver-release")
}
