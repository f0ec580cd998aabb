//! End-to-end runs against local repositories with a fake host and builder

use crate::helpers::*;
use anyhow::Result;
use driver_release::build::deb::deb_file_name;
use driver_release::build::rpm::rpm_file_name;
use driver_release::build::{Distribution, FileArchiver, PackageBuilder};
use driver_release::commands::{Capabilities, RunOutcome, execute};
use driver_release::core::config::{Arch, Mode, PackageConfig, ReleaseConfig, ValidatedOptions};
use driver_release::core::context::ReleaseContext;
use driver_release::core::error::{ReleaseError, ReleaseResult};
use driver_release::core::vcs::SystemVcs;
use driver_release::release::{CreatedRelease, NewRelease, ReleaseHost};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

/// In-memory host: publishing a draft adds its tag to the released set
struct LedgerHost {
  released: RefCell<Vec<String>>,
  created: RefCell<Vec<NewRelease>>,
  uploads: RefCell<Vec<PathBuf>>,
  deleted: Cell<usize>,
  /// Fail the upload of this many assets before accepting any
  failing_uploads: Cell<usize>,
}

impl LedgerHost {
  fn new(released: &[&str]) -> Self {
    Self {
      released: RefCell::new(released.iter().map(|t| t.to_string()).collect()),
      created: RefCell::new(Vec::new()),
      uploads: RefCell::new(Vec::new()),
      deleted: Cell::new(0),
      failing_uploads: Cell::new(0),
    }
  }
}

impl ReleaseHost for LedgerHost {
  fn list_release_tags(&self) -> ReleaseResult<Vec<String>> {
    Ok(self.released.borrow().clone())
  }

  fn create_release(&self, release: &NewRelease) -> ReleaseResult<CreatedRelease> {
    self.created.borrow_mut().push(release.clone());
    Ok(CreatedRelease {
      id: 1,
      tag_name: release.tag_name.clone(),
      html_url: String::new(),
      upload_url: String::new(),
    })
  }

  fn upload_asset(&self, _release: &CreatedRelease, path: &Path) -> ReleaseResult<()> {
    if self.failing_uploads.get() > 0 {
      self.failing_uploads.set(self.failing_uploads.get() - 1);
      return Err(ReleaseError::message("HTTP error: connection reset"));
    }
    self.uploads.borrow_mut().push(path.to_path_buf());
    Ok(())
  }

  fn publish_release(&self, release: &CreatedRelease) -> ReleaseResult<CreatedRelease> {
    self.released.borrow_mut().push(release.tag_name.clone());
    Ok(release.clone())
  }

  fn delete_release(&self, _release: &CreatedRelease) -> ReleaseResult<()> {
    self.deleted.set(self.deleted.get() + 1);
    self.uploads.borrow_mut().clear();
    Ok(())
  }
}

/// Leaves the files a real compile and packaging step would produce
struct StubBuilder {
  work_dir: PathBuf,
  xgl_dir: PathBuf,
}

impl PackageBuilder for StubBuilder {
  fn distribution(&self) -> ReleaseResult<Distribution> {
    Ok(Distribution::Ubuntu)
  }

  fn build_driver(&self, arch: Arch) -> ReleaseResult<()> {
    let build = self.xgl_dir.join(arch.build_dir());
    fs::create_dir_all(build.join("compiler/llpc"))?;
    fs::create_dir_all(build.join("spvgen"))?;
    fs::write(build.join("compiler/llpc/amdllpc"), "elf")?;
    fs::write(build.join("spvgen/spvgen.so"), "so")?;
    Ok(())
  }

  fn make_deb(&self, version: &str, arch: Arch) -> ReleaseResult<PathBuf> {
    let path = self.work_dir.join(deb_file_name(&PackageConfig::default(), version, arch));
    fs::write(&path, "deb")?;
    Ok(path)
  }

  fn make_rpm(&self, version: &str) -> ReleaseResult<PathBuf> {
    let path = self.work_dir.join(rpm_file_name(&PackageConfig::default(), version));
    fs::write(&path, "rpm")?;
    Ok(path)
  }
}

fn context(remote: &RemoteRoot, work_dir: &Path, mode: Mode) -> ReleaseContext {
  ReleaseContext::new(
    ValidatedOptions {
      work_dir: work_dir.to_path_buf(),
      access_token: "ghp_test".to_string(),
      target_repo: remote.url(),
      mode,
    },
    ReleaseConfig::default(),
  )
}

fn stub_builder(ctx: &ReleaseContext) -> StubBuilder {
  StubBuilder {
    work_dir: ctx.work_dir().to_path_buf(),
    xgl_dir: ctx.component_dir("xgl"),
  }
}

#[test]
fn test_new_tag_builds_packages() -> Result<()> {
  let remote = RemoteRoot::new()?;
  let pinned = seed_release(&remote, "v-2023.Q3.1", "Update Khronos headers")?;
  let work = tempfile::tempdir()?;
  let ctx = context(&remote, work.path(), Mode::Build);
  let host = LedgerHost::new(&["v-2023.Q2.3"]);
  let builder = stub_builder(&ctx);
  let caps = Capabilities {
    vcs: &SystemVcs,
    host: &host,
    builder: &builder,
    archiver: &FileArchiver,
  };

  let outcome = execute(&ctx, &caps, false)?;

  let RunOutcome::Built { tag, artifacts } = outcome else {
    panic!("expected a build outcome");
  };
  assert_eq!(tag, "v-2023.Q3.1");
  assert_eq!(artifacts.len(), 4);
  assert!(work.path().join("amdvlk_2023.Q3.1_amd64.deb").exists());
  assert!(work.path().join("amdllpc_i386.zip").exists());

  for (name, sha) in &pinned {
    assert_eq!(&rev_parse(&ctx.component_dir(name), "HEAD")?, sha);
  }
  let copyright = fs::read_to_string(ctx.pkg_shared_dir().join("copyright"))?;
  assert_eq!(copyright, "MIT License\n");
  Ok(())
}

#[test]
fn test_released_tag_skips_synchronization() -> Result<()> {
  let remote = RemoteRoot::new()?;
  seed_release(&remote, "v-2023.Q3.1", "Update")?;
  let work = tempfile::tempdir()?;
  let ctx = context(&remote, work.path(), Mode::Build);
  let host = LedgerHost::new(&["v-2023.Q2.3", "v-2023.Q3.1"]);
  let builder = stub_builder(&ctx);
  let caps = Capabilities {
    vcs: &SystemVcs,
    host: &host,
    builder: &builder,
    archiver: &FileArchiver,
  };

  let outcome = execute(&ctx, &caps, false)?;

  assert_eq!(
    outcome,
    RunOutcome::AlreadyReleased {
      tag: "v-2023.Q3.1".to_string()
    }
  );
  assert!(ctx.umbrella_dir().exists());
  assert!(!ctx.component_dir("xgl").exists());
  assert!(!ctx.pkg_shared_dir().exists());
  Ok(())
}

#[test]
fn test_build_then_release() -> Result<()> {
  let remote = RemoteRoot::new()?;
  seed_release(&remote, "v-2023.Q4.1", "2023.Q4.1 formal release")?;
  let work = tempfile::tempdir()?;
  let host = LedgerHost::new(&[]);

  let build_ctx = context(&remote, work.path(), Mode::Build);
  let builder = stub_builder(&build_ctx);
  let caps = Capabilities {
    vcs: &SystemVcs,
    host: &host,
    builder: &builder,
    archiver: &FileArchiver,
  };
  execute(&build_ctx, &caps, false)?;

  // the RPM comes from a separate RHEL build host
  builder.make_rpm("2023.Q4.1")?;

  let release_ctx = context(&remote, work.path(), Mode::Release);
  let outcome = execute(&release_ctx, &caps, false)?;

  let created = host.created.borrow();
  assert_eq!(created.len(), 1);
  assert!(!created[0].prerelease);
  assert!(created[0].body.ends_with("2023.Q4.1 formal release"));

  let uploads = host.uploads.borrow();
  assert_eq!(uploads.len(), 6);
  let sums = fs::read_to_string(work.path().join("SHA256SUMS"))?;
  assert_eq!(sums.lines().count(), 5);
  assert!(sums.contains("  amdvlk-2023.Q4.1-el.x86_64.rpm\n"));
  assert!(matches!(outcome, RunOutcome::Published { .. }));
  assert!(created[0].draft);
  drop((created, uploads));

  // published, so the next run has nothing to do
  assert_eq!(
    execute(&release_ctx, &caps, false)?,
    RunOutcome::AlreadyReleased {
      tag: "v-2023.Q4.1".to_string()
    }
  );
  Ok(())
}

#[test]
fn test_interrupted_release_is_retried() -> Result<()> {
  let remote = RemoteRoot::new()?;
  seed_release(&remote, "v-2023.Q3.1", "Update")?;
  let work = tempfile::tempdir()?;
  let host = LedgerHost::new(&[]);
  host.failing_uploads.set(1);

  let ctx = context(&remote, work.path(), Mode::Build);
  let builder = stub_builder(&ctx);
  let caps = Capabilities {
    vcs: &SystemVcs,
    host: &host,
    builder: &builder,
    archiver: &FileArchiver,
  };
  execute(&ctx, &caps, false)?;
  builder.make_rpm("2023.Q3.1")?;

  let release_ctx = context(&remote, work.path(), Mode::Release);
  assert!(execute(&release_ctx, &caps, false).is_err());
  assert_eq!(host.deleted.get(), 1);
  assert!(host.released.borrow().is_empty());

  let outcome = execute(&release_ctx, &caps, false)?;

  assert!(matches!(outcome, RunOutcome::Published { ref tag, .. } if tag == "v-2023.Q3.1"));
  assert_eq!(host.created.borrow().len(), 2);
  assert_eq!(host.uploads.borrow().len(), 6);
  assert_eq!(*host.released.borrow(), vec!["v-2023.Q3.1".to_string()]);
  Ok(())
}
