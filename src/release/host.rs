//! Release host capability and its GitHub implementation
//!
//! The hosting service is consumed, not modelled: list what has been
//! released, create a release, attach files to it.

use crate::core::error::{LookupError, ReleaseError, ReleaseResult, ResultExt};
use reqwest::{StatusCode, Url};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Release to be created on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
  pub tag_name: String,
  pub name: String,
  pub body: String,
  pub draft: bool,
  pub prerelease: bool,
}

/// Release as returned by the host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedRelease {
  pub id: u64,
  pub tag_name: String,
  #[serde(default)]
  pub html_url: String,
  /// RFC 6570 template, e.g. `https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}`
  #[serde(default)]
  pub upload_url: String,
}

pub trait ReleaseHost {
  /// Tag names of every published release; drafts do not count. Fails with
  /// `LookupError::RepoNotFound` when the repository does not exist.
  fn list_release_tags(&self) -> ReleaseResult<Vec<String>>;

  fn create_release(&self, release: &NewRelease) -> ReleaseResult<CreatedRelease>;

  /// Upload a file as a release asset named after the file
  fn upload_asset(&self, release: &CreatedRelease, path: &Path) -> ReleaseResult<()>;

  /// Turn a draft into a published release
  fn publish_release(&self, release: &CreatedRelease) -> ReleaseResult<CreatedRelease>;

  fn delete_release(&self, release: &CreatedRelease) -> ReleaseResult<()>;
}

pub const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct ReleaseSummary {
  tag_name: String,
  #[serde(default)]
  draft: bool,
}

#[derive(Debug, Serialize)]
struct ReleaseUpdate {
  draft: bool,
}

/// GitHub REST API client (blocking)
pub struct GitHubHost {
  client: Client,
  api_base: String,
  owner: String,
  repo: String,
  token: String,
}

impl GitHubHost {
  pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: impl Into<String>) -> ReleaseResult<Self> {
    let client = Client::builder()
      .user_agent(concat!("driver-release/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self {
      client,
      api_base: GITHUB_API.to_string(),
      owner: owner.into(),
      repo: repo.into(),
      token: token.into(),
    })
  }

  /// Build from the target repository root (`https://github.com/<owner>/`) and
  /// the umbrella repository name
  pub fn from_target(target_repo: &str, umbrella: &str, token: &str) -> ReleaseResult<Self> {
    let owner = parse_github_owner(target_repo).ok_or_else(|| {
      ReleaseError::with_help(
        format!("Cannot derive a GitHub owner from '{}'", target_repo),
        "Use --target-repo https://github.com/<owner>/",
      )
    })?;
    Self::new(owner, umbrella, token)
  }

  /// Point at a different API endpoint (GitHub Enterprise)
  pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
    self.api_base = api_base.into().trim_end_matches('/').to_string();
    self
  }

  fn repo_url(&self) -> String {
    format!("{}/repos/{}/{}", self.api_base, self.owner, self.repo)
  }

  fn get(&self, url: &str) -> ReleaseResult<Response> {
    tracing::debug!(%url, "GET");
    Ok(
      self
        .client
        .get(url)
        .bearer_auth(&self.token)
        .header(ACCEPT, "application/vnd.github+json")
        .header("X-GitHub-Api-Version", "2022-11-28")
        .send()?,
    )
  }

  fn ensure_repo_exists(&self) -> ReleaseResult<()> {
    let response = self.get(&self.repo_url())?;
    if response.status() == StatusCode::NOT_FOUND {
      return Err(
        LookupError::RepoNotFound {
          owner: self.owner.clone(),
          repo: self.repo.clone(),
        }
        .into(),
      );
    }
    check_status(response, &self.repo_url()).map(|_| ())
  }
}

impl ReleaseHost for GitHubHost {
  fn list_release_tags(&self) -> ReleaseResult<Vec<String>> {
    self.ensure_repo_exists()?;

    let mut tags = Vec::new();
    for page in 1.. {
      let url = format!("{}/releases?per_page=100&page={}", self.repo_url(), page);
      let releases: Vec<ReleaseSummary> = check_status(self.get(&url)?, &url)?.json()?;
      let done = releases.len() < 100;
      tags.extend(published_tags(releases));
      if done {
        break;
      }
    }

    tracing::debug!(count = tags.len(), "fetched released tags");
    Ok(tags)
  }

  fn create_release(&self, release: &NewRelease) -> ReleaseResult<CreatedRelease> {
    let url = format!("{}/releases", self.repo_url());
    tracing::debug!(%url, tag = %release.tag_name, "POST");
    let response = self
      .client
      .post(&url)
      .bearer_auth(&self.token)
      .header(ACCEPT, "application/vnd.github+json")
      .header("X-GitHub-Api-Version", "2022-11-28")
      .json(release)
      .send()?;
    Ok(check_status(response, &url)?.json()?)
  }

  fn upload_asset(&self, release: &CreatedRelease, path: &Path) -> ReleaseResult<()> {
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .ok_or_else(|| ReleaseError::message(format!("Not a file: {}", path.display())))?;
    let data = fs::read(path).with_context(|| format!("Failed to read asset {}", path.display()))?;

    let url = asset_url(&release.upload_url, &file_name)?;
    tracing::debug!(%url, bytes = data.len(), "upload");

    let response = self
      .client
      .post(url.clone())
      .bearer_auth(&self.token)
      .header(ACCEPT, "application/vnd.github+json")
      .header(CONTENT_TYPE, "application/octet-stream")
      .body(data)
      .send()?;
    check_status(response, url.as_str())?;
    Ok(())
  }

  fn publish_release(&self, release: &CreatedRelease) -> ReleaseResult<CreatedRelease> {
    let url = format!("{}/releases/{}", self.repo_url(), release.id);
    tracing::debug!(%url, tag = %release.tag_name, "PATCH");
    let response = self
      .client
      .patch(&url)
      .bearer_auth(&self.token)
      .header(ACCEPT, "application/vnd.github+json")
      .header("X-GitHub-Api-Version", "2022-11-28")
      .json(&ReleaseUpdate { draft: false })
      .send()?;
    Ok(check_status(response, &url)?.json()?)
  }

  fn delete_release(&self, release: &CreatedRelease) -> ReleaseResult<()> {
    let url = format!("{}/releases/{}", self.repo_url(), release.id);
    tracing::debug!(%url, tag = %release.tag_name, "DELETE");
    let response = self
      .client
      .delete(&url)
      .bearer_auth(&self.token)
      .header(ACCEPT, "application/vnd.github+json")
      .header("X-GitHub-Api-Version", "2022-11-28")
      .send()?;
    check_status(response, &url)?;
    Ok(())
  }
}

fn published_tags(releases: Vec<ReleaseSummary>) -> impl Iterator<Item = String> {
  releases.into_iter().filter(|r| !r.draft).map(|r| r.tag_name)
}

fn check_status(response: Response, url: &str) -> ReleaseResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  let body = response.text().unwrap_or_default();
  Err(
    LookupError::HostStatus {
      url: url.to_string(),
      status: status.as_u16(),
      body,
    }
    .into(),
  )
}

/// Strip the `{?name,label}` template suffix from an upload URL
fn upload_base(upload_url: &str) -> &str {
  upload_url.split('{').next().unwrap_or(upload_url)
}

/// Upload endpoint for one asset, with the file name query-encoded
fn asset_url(upload_url: &str, file_name: &str) -> ReleaseResult<Url> {
  let mut url = Url::parse(upload_base(upload_url))
    .map_err(|e| ReleaseError::message(format!("Invalid upload URL '{}': {}", upload_url, e)))?;
  url.query_pairs_mut().append_pair("name", file_name);
  Ok(url)
}

/// Owner from a GitHub root URL
///
/// Accepts `https://github.com/<owner>[/...]` and `git@github.com:<owner>[/...]`.
pub fn parse_github_owner(url: &str) -> Option<String> {
  let rest = url
    .strip_prefix("https://github.com/")
    .or_else(|| url.strip_prefix("http://github.com/"))
    .or_else(|| url.strip_prefix("git@github.com:"))?;
  let owner = rest.split('/').next()?.trim();
  if owner.is_empty() {
    return None;
  }
  Some(owner.to_string())
}
