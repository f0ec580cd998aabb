use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET_REPO: &str = "https://github.com/GPUOpen-Drivers/";

/// Configuration for driver-release
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// Every field has a default, so a run without any file behaves exactly like
/// the stock AMDVLK release: umbrella `AMDVLK`, manifest `default.xml`, seven
/// tracked components.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
  /// Name of the umbrella repository whose tags drive releases
  pub umbrella: String,
  /// Manifest file inside the umbrella checkout
  pub manifest: String,
  /// Base branch name used by the standard and LLVM branch rules
  pub base_branch: String,
  /// Tracked components, synchronized and pinned in this order
  pub components: Vec<ComponentConfig>,
  /// Architectures built on Debian-family hosts
  pub architectures: Vec<Arch>,
  pub package: PackageConfig,
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      umbrella: "AMDVLK".to_string(),
      manifest: "default.xml".to_string(),
      base_branch: "dev".to_string(),
      components: default_components(),
      architectures: vec![Arch::Amd64, Arch::I386],
      package: PackageConfig::default(),
    }
  }
}

fn default_components() -> Vec<ComponentConfig> {
  ["xgl", "pal", "llpc", "spvgen", "llvm-project", "MetroHash", "CWPack"]
    .into_iter()
    .map(ComponentConfig::new)
    .collect()
}

/// How a component's tracking branch is named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchRule {
  /// `<base>`
  Standard,
  /// `amd-gfx-gpuopen-<base>` for the LLVM-derived compiler fork
  Llvm,
  /// `amd-master` for the third-party libraries imported under their upstream names
  Legacy,
}

impl BranchRule {
  /// Rule applied when a component does not declare one
  pub fn for_component(name: &str) -> Self {
    match name {
      "llvm-project" => BranchRule::Llvm,
      "MetroHash" | "CWPack" => BranchRule::Legacy,
      _ => BranchRule::Standard,
    }
  }

  pub fn branch_name(self, base: &str) -> String {
    match self {
      BranchRule::Standard => base.to_string(),
      BranchRule::Llvm => format!("amd-gfx-gpuopen-{}", base),
      BranchRule::Legacy => "amd-master".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentConfig {
  pub name: String,
  /// Branch rule; inferred from the name when omitted
  #[serde(default)]
  pub rule: Option<BranchRule>,
  /// Explicit branch, wins over any rule
  #[serde(default)]
  pub branch: Option<String>,
}

impl ComponentConfig {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      rule: None,
      branch: None,
    }
  }

  /// Branch the synchronizer fast-forwards this component to
  pub fn tracking_branch(&self, base: &str) -> String {
    if let Some(branch) = &self.branch {
      return branch.clone();
    }
    self
      .rule
      .unwrap_or_else(|| BranchRule::for_component(&self.name))
      .branch_name(base)
  }
}

/// Target architecture of a Debian package build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
  Amd64,
  I386,
}

impl Arch {
  /// Debian architecture name
  pub fn as_str(self) -> &'static str {
    match self {
      Arch::Amd64 => "amd64",
      Arch::I386 => "i386",
    }
  }

  /// CMake build directory inside the xgl checkout
  pub fn build_dir(self) -> &'static str {
    match self {
      Arch::Amd64 => "rbuild64",
      Arch::I386 => "rbuild32",
    }
  }

  pub fn lib_triplet(self) -> &'static str {
    match self {
      Arch::Amd64 => "x86_64-linux-gnu",
      Arch::I386 => "i386-linux-gnu",
    }
  }

  pub fn icd_name(self) -> &'static str {
    match self {
      Arch::Amd64 => "amdvlk64.so",
      Arch::I386 => "amdvlk32.so",
    }
  }

  pub fn icd_json_name(self) -> &'static str {
    match self {
      Arch::Amd64 => "amd_icd64.json",
      Arch::I386 => "amd_icd32.json",
    }
  }
}

/// Package metadata written into control and spec files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
  pub name: String,
  pub maintainer: String,
  pub homepage: String,
  /// Whether a release run expects and uploads the RHEL package
  pub rpm: bool,
  /// Overrides `$HOME/rpmbuild`
  pub rpmbuild_dir: Option<PathBuf>,
}

impl Default for PackageConfig {
  fn default() -> Self {
    Self {
      name: "amdvlk".to_string(),
      maintainer: "Advanced Micro Devices (AMD) <gpudriverdevsupport@amd.com>".to_string(),
      homepage: "https://github.com/GPUOpen-Drivers/AMDVLK".to_string(),
      rpm: true,
      rpmbuild_dir: None,
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from an explicit file, or search the work directory.
  /// Falls back to defaults when nothing is found.
  pub fn load(work_dir: &Path, explicit: Option<&Path>) -> ReleaseResult<Self> {
    let config_path = match explicit {
      Some(path) => {
        if !path.exists() {
          return Err(ReleaseError::Config(ConfigError::InvalidFile {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
          }));
        }
        path.to_path_buf()
      }
      None => match Self::find_config_path(work_dir) {
        Some(path) => path,
        None => {
          tracing::debug!(work_dir = %work_dir.display(), "no release.toml found, using defaults");
          return Ok(Self::default());
        }
      },
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).map_err(|e| {
      ReleaseError::Config(ConfigError::InvalidFile {
        path: config_path.clone(),
        reason: e.to_string(),
      })
    })?;

    tracing::debug!(path = %config_path.display(), components = config.components.len(), "loaded config");
    Ok(config)
  }

  pub fn parse(content: &str) -> ReleaseResult<Self> {
    let config: ReleaseConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> ReleaseResult<()> {
    if self.umbrella.is_empty() {
      return Err(ReleaseError::message("umbrella repository name must not be empty"));
    }
    check_repo_name(&self.umbrella)?;
    if self.components.is_empty() {
      return Err(ReleaseError::with_help(
        "No components configured",
        "Add at least one [[components]] entry or remove the list to use the defaults",
      ));
    }
    let mut seen = std::collections::HashSet::new();
    for component in &self.components {
      check_repo_name(&component.name)?;
      if component.name == self.umbrella {
        return Err(ReleaseError::message(format!(
          "Component '{}' has the same name as the umbrella repository",
          component.name
        )));
      }
      if !seen.insert(component.name.as_str()) {
        return Err(ReleaseError::message(format!(
          "Component '{}' is listed more than once",
          component.name
        )));
      }
    }
    Ok(())
  }

  pub fn component_names(&self) -> Vec<&str> {
    self.components.iter().map(|c| c.name.as_str()).collect()
  }
}

/// Repository names become directories under the source dir, so they must be
/// a single plain path component
fn check_repo_name(name: &str) -> ReleaseResult<()> {
  if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
    return Err(ReleaseError::message(format!(
      "'{}' is not a valid repository name",
      name
    )));
  }
  Ok(())
}

/// What a run does once the tree is pinned
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
  /// Build the driver and produce packages and tool archives
  Build,
  /// Publish a release with the previously built artifacts
  Release,
}

/// Options supplied on the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
  pub work_dir: PathBuf,
  pub access_token: Option<String>,
  pub target_repo: String,
  pub choice: Option<Mode>,
}

/// Options after the required ones have been checked
#[derive(Debug, Clone)]
pub struct ValidatedOptions {
  pub work_dir: PathBuf,
  pub access_token: String,
  pub target_repo: String,
  pub mode: Mode,
}

impl RunOptions {
  /// Reject missing token or mode before anything touches disk or network
  pub fn validate(self) -> ReleaseResult<ValidatedOptions> {
    let access_token = match self.access_token {
      Some(token) if !token.trim().is_empty() => token,
      _ => {
        return Err(ReleaseError::Config(ConfigError::MissingOption {
          option: "access-token".to_string(),
        }));
      }
    };
    let mode = self.choice.ok_or_else(|| {
      ReleaseError::Config(ConfigError::MissingOption {
        option: "choice".to_string(),
      })
    })?;
    if self.target_repo.trim().is_empty() {
      return Err(ReleaseError::Config(ConfigError::InvalidOption {
        option: "target-repo".to_string(),
        value: self.target_repo,
      }));
    }

    Ok(ValidatedOptions {
      work_dir: self.work_dir,
      access_token,
      target_repo: self.target_repo,
      mode,
    })
  }
}
