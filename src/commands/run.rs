//! One driver release run
//!
//! ```text
//! released tags ─┐
//!                ├─ decide ─ no-op? ── stop
//! latest tag ────┘              │
//!                          synchronize ─ pin ─┬─ build:   compile, package, archive
//!                                             └─ release: checksum, create, upload
//! ```
//!
//! `execute` only talks to the capability traits, so every path through it
//! can be driven by fakes. `run_release` wires up the real implementations.

use crate::build::archive::{self, Archiver, FileArchiver};
use crate::build::changelog::write_shared_docs;
use crate::build::{Distribution, PackageBuilder, SystemPackager, deb, rpm};
use crate::core::config::{Arch, Mode, ReleaseConfig, RunOptions};
use crate::core::context::ReleaseContext;
use crate::core::error::{LookupError, ReleaseResult, ResultExt};
use crate::core::pin::{PinnedRun, RevisionPinner};
use crate::core::sync::RepositorySynchronizer;
use crate::core::vcs::{SystemVcs, VersionControl};
use crate::release::checksums::write_checksums;
use crate::release::{CreatedRelease, Decision, GitHubHost, NewRelease, ReleaseHost, ReleaseSet, latest_tag};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of every release body
pub const INSTALL_NOTE: &str =
  "[Driver installation instruction](https://github.com/GPUOpen-Drivers/AMDVLK#install-with-pre-built-driver) \n\n";

/// External collaborators of a run
pub struct Capabilities<'a> {
  pub vcs: &'a dyn VersionControl,
  pub host: &'a dyn ReleaseHost,
  pub builder: &'a dyn PackageBuilder,
  pub archiver: &'a dyn Archiver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
  /// Umbrella repository has no tags
  NoTags,
  /// Newest tag already has a release
  AlreadyReleased { tag: String },
  Built { tag: String, artifacts: Vec<PathBuf> },
  Published { tag: String, url: String, assets: Vec<PathBuf> },
}

/// CLI entry point: validate, load config, run with the real capabilities
pub fn run_release(options: RunOptions, config_path: Option<&Path>) -> ReleaseResult<RunOutcome> {
  let mut validated = options.validate()?;
  if !validated.work_dir.is_absolute() {
    validated.work_dir = env::current_dir()?.join(&validated.work_dir);
  }
  fs::create_dir_all(&validated.work_dir)
    .with_context(|| format!("Failed to create work directory {}", validated.work_dir.display()))?;

  let config = ReleaseConfig::load(&validated.work_dir, config_path)?;
  println!("📦 Work directory: {}", validated.work_dir.display());

  let ctx = ReleaseContext::new(validated, config);
  let host = GitHubHost::from_target(&ctx.target_repo, &ctx.config.umbrella, &ctx.access_token)?;
  let builder = SystemPackager::new(&ctx);
  let caps = Capabilities {
    vcs: &SystemVcs,
    host: &host,
    builder: &builder,
    archiver: &FileArchiver,
  };

  let outcome = execute(&ctx, &caps, true)?;
  report(&outcome);
  Ok(outcome)
}

/// Run every stage against the given capabilities
pub fn execute(ctx: &ReleaseContext, caps: &Capabilities<'_>, show_progress: bool) -> ReleaseResult<RunOutcome> {
  let umbrella = &ctx.config.umbrella;

  println!("🔍 Checking published releases of {}...", umbrella);
  let released = ReleaseSet::fetch(caps.host)?;
  let latest = latest_tag(caps.vcs, &ctx.umbrella_url(), &ctx.umbrella_dir())?;
  tracing::info!(released = released.len(), latest = ?latest, "release ledger");

  let tag = match Decision::decide(latest.as_deref(), &released) {
    Decision::NoTags => return Ok(RunOutcome::NoTags),
    Decision::AlreadyReleased(tag) => return Ok(RunOutcome::AlreadyReleased { tag }),
    Decision::Process(tag) => tag,
  };
  println!("🏷️  New tag {} found", tag);

  println!("🔄 Synchronizing {} components...", ctx.config.components.len());
  RepositorySynchronizer::new(caps.vcs, &ctx.target_repo, &ctx.src_dir(), &ctx.config.base_branch)
    .with_progress(show_progress)
    .synchronize(&ctx.config.components)?;

  println!("📌 Pinning sources to {}...", tag);
  let pinned = RevisionPinner::new(caps.vcs, &ctx.src_dir(), umbrella, &ctx.config.manifest)
    .pin(&tag, &ctx.config.component_names())?;

  match ctx.mode {
    Mode::Build => build_stage(ctx, caps, &pinned),
    Mode::Release => release_stage(ctx, caps, &pinned),
  }
}

fn build_stage(ctx: &ReleaseContext, caps: &Capabilities<'_>, pinned: &PinnedRun) -> ReleaseResult<RunOutcome> {
  let distro = caps.builder.distribution()?;
  let arches = match distro {
    Distribution::Ubuntu => ctx.config.architectures.clone(),
    Distribution::Rhel => vec![Arch::Amd64],
  };
  println!("🔨 Building {} for {} ({})...", pinned.version(), distro, arch_list(&arches));

  for &arch in &arches {
    caps.builder.build_driver(arch)?;
  }

  write_shared_docs(
    &ctx.pkg_shared_dir(),
    &ctx.umbrella_dir(),
    &ctx.config.package,
    &pinned.tag,
    caps.archiver,
  )?;

  let mut artifacts = Vec::new();
  match distro {
    Distribution::Ubuntu => {
      let xgl_dir = ctx.component_dir("xgl");
      for &arch in &arches {
        artifacts.push(caps.builder.make_deb(pinned.version(), arch)?);
        artifacts.push(archive::archive_tools(ctx.work_dir(), &xgl_dir, arch, caps.archiver)?);
      }
    }
    Distribution::Rhel => artifacts.push(caps.builder.make_rpm(pinned.version())?),
  }

  Ok(RunOutcome::Built {
    tag: pinned.tag.name.clone(),
    artifacts,
  })
}

fn release_stage(ctx: &ReleaseContext, caps: &Capabilities<'_>, pinned: &PinnedRun) -> ReleaseResult<RunOutcome> {
  let mut assets = expected_artifacts(ctx, pinned.version());
  if let Some(missing) = assets.iter().find(|path| !path.exists()) {
    return Err(LookupError::ArtifactMissing { path: missing.clone() }.into());
  }
  assets.push(write_checksums(ctx.work_dir(), &assets)?);

  let release = release_request(pinned);
  println!(
    "🚀 Creating {} {}...",
    if release.prerelease { "pre-release" } else { "release" },
    release.tag_name
  );
  let draft = caps.host.create_release(&release)?;

  let published = match upload_and_publish(caps.host, &draft, &assets) {
    Ok(published) => published,
    Err(err) => {
      // Leave nothing half-uploaded behind so the next run starts over
      if let Err(cleanup) = caps.host.delete_release(&draft) {
        tracing::warn!(tag = %draft.tag_name, error = %cleanup, "failed to delete draft release");
      }
      return Err(err);
    }
  };

  Ok(RunOutcome::Published {
    tag: release.tag_name,
    url: published.html_url,
    assets,
  })
}

fn upload_and_publish(host: &dyn ReleaseHost, draft: &CreatedRelease, assets: &[PathBuf]) -> ReleaseResult<CreatedRelease> {
  for asset in assets {
    println!("   Uploading {}", asset.display());
    host
      .upload_asset(draft, asset)
      .with_context(|| format!("Failed to upload {}", asset.display()))?;
  }
  host.publish_release(draft)
}

/// Draft release named and tagged after the pinned tag
///
/// It stays a draft until every asset is attached.
pub fn release_request(pinned: &PinnedRun) -> NewRelease {
  NewRelease {
    tag_name: pinned.tag.name.clone(),
    name: pinned.tag.name.clone(),
    body: format!("{}{}", INSTALL_NOTE, pinned.tag.description),
    draft: true,
    prerelease: !pinned.tag.is_formal_release(),
  }
}

/// Everything a release run uploads, besides `SHA256SUMS`
///
/// Debian packages and tool archives come from the Ubuntu build host, the
/// RPM from the RHEL one; all of them must already sit in the work dir.
pub fn expected_artifacts(ctx: &ReleaseContext, version: &str) -> Vec<PathBuf> {
  let package = &ctx.config.package;
  let mut paths = Vec::new();
  for &arch in &ctx.config.architectures {
    paths.push(ctx.work_dir().join(deb::deb_file_name(package, version, arch)));
    paths.push(ctx.work_dir().join(archive::tools_archive_name(arch)));
  }
  if package.rpm {
    paths.push(ctx.work_dir().join(rpm::rpm_file_name(package, version)));
  }
  paths
}

fn arch_list(arches: &[Arch]) -> String {
  arches.iter().map(|a| a.as_str()).collect::<Vec<_>>().join(", ")
}

fn report(outcome: &RunOutcome) {
  match outcome {
    RunOutcome::NoTags => println!("⚠️  No tags in the umbrella repository, nothing to do"),
    RunOutcome::AlreadyReleased { tag } => println!("✅ {} is already released, nothing to do", tag),
    RunOutcome::Built { tag, artifacts } => {
      println!("\n🎉 Built {}:", tag);
      for artifact in artifacts {
        println!("   • {}", artifact.display());
      }
    }
    RunOutcome::Published { tag, url, assets } => {
      println!("\n🎉 Published {} with {} assets", tag, assets.len());
      if !url.is_empty() {
        println!("   {}", url);
      }
    }
  }
}
