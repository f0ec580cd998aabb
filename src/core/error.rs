//! Error types for driver-release with contextual messages and exit codes
//!
//! Every failure in a run is fatal at the point of detection. Errors travel
//! back to `main` as values and are mapped to an exit code there, so each
//! failure path can be exercised in tests without terminating the process.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for driver-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Configuration error (missing option, bad config file)
  User = 1,
  /// System error (git, external tools, network, I/O)
  System = 2,
  /// Lookup or resolution failure (repo not found, unknown distro, manifest miss)
  Lookup = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for driver-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors (clone, checkout, pull)
  Git(GitError),

  /// Remote or host lookups that came back empty
  Lookup(LookupError),

  /// Manifest parsing and revision resolution
  Manifest(ManifestError),

  /// External build, packaging and archiving tools
  Tool(ToolError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(e) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, e),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::Lookup(_) => ExitCode::Lookup,
      ReleaseError::Manifest(_) => ExitCode::Lookup,
      ReleaseError::Tool(_) => ExitCode::System,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::System,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Lookup(e) => e.help_message(),
      ReleaseError::Manifest(e) => e.help_message(),
      ReleaseError::Tool(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Io(_) => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Lookup(e) => write!(f, "{}", e),
      ReleaseError::Manifest(e) => write!(f, "{}", e),
      ReleaseError::Tool(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<LookupError> for ReleaseError {
  fn from(err: LookupError) -> Self {
    ReleaseError::Lookup(err)
  }
}

impl From<ManifestError> for ReleaseError {
  fn from(err: ManifestError) -> Self {
    ReleaseError::Manifest(err)
  }
}

impl From<ToolError> for ReleaseError {
  fn from(err: ToolError) -> Self {
    ReleaseError::Tool(err)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<reqwest::Error> for ReleaseError {
  fn from(err: reqwest::Error) -> Self {
    ReleaseError::message(format!("HTTP error: {}", err))
  }
}

impl From<zip::result::ZipError> for ReleaseError {
  fn from(err: zip::result::ZipError) -> Self {
    ReleaseError::message(format!("Zip archive error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ReleaseError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ReleaseError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A required run option was not supplied
  MissingOption { option: String },

  /// Unparseable value for an option
  InvalidOption { option: String, value: String },

  /// Config file exists but is unusable
  InvalidFile { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingOption { option } if option == "access-token" => {
        Some("Pass --access-token <TOKEN> or export GITHUB_TOKEN.".to_string())
      }
      ConfigError::MissingOption { option } if option == "choice" => {
        Some("Pass --choice build or --choice release.".to_string())
      }
      ConfigError::InvalidFile { path, .. } => Some(format!("Fix or remove {}", path.display())),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingOption { option } => {
        write!(f, "Missing required option: --{}", option)
      }
      ConfigError::InvalidOption { option, value } => {
        write!(f, "Invalid value '{}' for option --{}", value, option)
      }
      ConfigError::InvalidFile { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed inside a repository
  CommandFailed {
    repo: PathBuf,
    command: String,
    stderr: String,
  },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Clone of a component failed
  CloneFailed { url: String, stderr: String },

  /// Checkout of a branch, tag or revision failed
  CheckoutFailed {
    repo: PathBuf,
    reference: String,
    stderr: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::CloneFailed { url, .. } => Some(format!(
        "Check that {} exists and is reachable with your git credentials.",
        url
      )),
      GitError::CheckoutFailed { reference, .. } => Some(format!(
        "Fetch the remote and confirm '{}' exists, then re-run from the top.",
        reference
      )),
      GitError::RepoNotFound { path } => Some(format!(
        "Remove {} so it can be cloned fresh on the next run.",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { repo, command, stderr } => {
        write!(f, "Git command failed in {}: {}\n{}", repo.display(), command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::CloneFailed { url, stderr } => {
        write!(f, "Failed to clone {}\n{}", url, stderr)
      }
      GitError::CheckoutFailed { repo, reference, stderr } => {
        write!(f, "Failed to check out '{}' in {}\n{}", reference, repo.display(), stderr)
      }
    }
  }
}

/// Lookup errors against the hosting service or the host machine
#[derive(Debug)]
pub enum LookupError {
  /// Umbrella repository not found on the hosting service
  RepoNotFound { owner: String, repo: String },

  /// Host distribution is neither Ubuntu nor RHEL
  UnknownDistribution { name: String },

  /// Hosting service answered with an unexpected status
  HostStatus { url: String, status: u16, body: String },

  /// A build artifact expected for release is missing
  ArtifactMissing { path: PathBuf },
}

impl LookupError {
  fn help_message(&self) -> Option<String> {
    match self {
      LookupError::RepoNotFound { .. } => {
        Some("Check --target-repo and that the access token can read the repository.".to_string())
      }
      LookupError::UnknownDistribution { .. } => {
        Some("Packages can only be built on Ubuntu or Red Hat Enterprise Linux.".to_string())
      }
      LookupError::ArtifactMissing { .. } => {
        Some("Run with --choice build first so the packages exist in the work directory.".to_string())
      }
      LookupError::HostStatus { status: 401, .. } | LookupError::HostStatus { status: 403, .. } => {
        Some("The access token was rejected. Check its scopes.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for LookupError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LookupError::RepoNotFound { owner, repo } => {
        write!(f, "Repository {}/{} not found on the hosting service", owner, repo)
      }
      LookupError::UnknownDistribution { name } => {
        write!(f, "Unknown Linux distribution: {}", name)
      }
      LookupError::HostStatus { url, status, body } => {
        write!(f, "Hosting service returned {} for {}\n{}", status, url, body)
      }
      LookupError::ArtifactMissing { path } => {
        write!(f, "Release artifact not found: {}", path.display())
      }
    }
  }
}

/// Manifest parsing and revision resolution errors
#[derive(Debug)]
pub enum ManifestError {
  /// Manifest file is not present in the umbrella checkout
  NotFound { path: PathBuf },

  /// Markup could not be parsed
  Malformed { reason: String },

  /// A tracked component has no usable revision record
  MissingRevision { component: String },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::MissingRevision { component } => Some(format!(
        "Add a <project name=\"{}\" revision=\"...\"/> record to the manifest or drop the component from release.toml.",
        component
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::NotFound { path } => write!(f, "Manifest not found: {}", path.display()),
      ManifestError::Malformed { reason } => write!(f, "Malformed manifest: {}", reason),
      ManifestError::MissingRevision { component } => {
        write!(f, "Manifest has no revision for component '{}'", component)
      }
    }
  }
}

/// External tool errors
#[derive(Debug)]
pub enum ToolError {
  /// The program could not be started at all
  NotInstalled { program: String },

  /// The program ran and exited non-zero
  Failed {
    command: String,
    status: Option<i32>,
    stderr: String,
  },
}

impl ToolError {
  fn help_message(&self) -> Option<String> {
    match self {
      ToolError::NotInstalled { program } => Some(format!("Install '{}' and make sure it is on PATH.", program)),
      ToolError::Failed { .. } => None,
    }
  }
}

impl fmt::Display for ToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolError::NotInstalled { program } => write!(f, "Failed to run '{}': not found", program),
      ToolError::Failed { command, status, stderr } => {
        match status {
          Some(code) => write!(f, "Command failed with exit code {}: {}", code, command)?,
          None => write!(f, "Command terminated by signal: {}", command)?,
        }
        if !stderr.is_empty() {
          write!(f, "\n{}", stderr)?;
        }
        Ok(())
      }
    }
  }
}

/// Result type alias for driver-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for ReleaseError {
  fn from(err: anyhow::Error) -> Self {
    ReleaseError::message(err.to_string())
  }
}
