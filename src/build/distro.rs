//! Host distribution detection

use crate::core::error::{LookupError, ReleaseResult};
use crate::core::exec::run_tool_stdout;
use std::fmt;
use std::process::Command;

/// Distributions packages can be built on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
  /// Debian packages, one per architecture, plus tool archives
  Ubuntu,
  /// A single x86_64 RPM
  Rhel,
}

impl Distribution {
  /// Map the distributor id printed by `lsb_release -is`
  pub fn from_lsb_id(id: &str) -> ReleaseResult<Self> {
    match id.trim() {
      "Ubuntu" => Ok(Distribution::Ubuntu),
      "RedHatEnterprise" | "RedHatEnterpriseWorkstation" | "RedHatEnterpriseServer" => Ok(Distribution::Rhel),
      other => Err(
        LookupError::UnknownDistribution {
          name: other.to_string(),
        }
        .into(),
      ),
    }
  }

  pub fn detect() -> ReleaseResult<Self> {
    let id = run_tool_stdout(Command::new("lsb_release").arg("-is"))?;
    tracing::debug!(%id, "lsb_release");
    Self::from_lsb_id(&id)
  }
}

impl fmt::Display for Distribution {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Distribution::Ubuntu => write!(f, "Ubuntu"),
      Distribution::Rhel => write!(f, "RHEL"),
    }
  }
}
