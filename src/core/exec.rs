//! Running external tools (cmake, ninja, dpkg, rpmbuild, lsb_release, ...)
//!
//! Tools are opaque: the only contract is the exit status and whatever they
//! leave on disk. A missing binary and a non-zero exit are both `ToolError`.

use crate::core::error::{ReleaseResult, ToolError};
use std::io;
use std::process::{Command, Output};

/// Render a command the way a user would type it
pub fn describe(cmd: &Command) -> String {
  let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
  parts.extend(cmd.get_args().map(|a| a.to_string_lossy().to_string()));
  parts.join(" ")
}

/// Run a command to completion, capturing output
pub fn run_tool(cmd: &mut Command) -> ReleaseResult<Output> {
  let command = describe(cmd);
  if let Some(dir) = cmd.get_current_dir() {
    tracing::debug!(cwd = %dir.display(), %command, "running");
  } else {
    tracing::debug!(%command, "running");
  }

  let output = cmd.output().map_err(|e| {
    if e.kind() == io::ErrorKind::NotFound {
      ToolError::NotInstalled {
        program: cmd.get_program().to_string_lossy().to_string(),
      }
    } else {
      ToolError::Failed {
        command: command.clone(),
        status: None,
        stderr: e.to_string(),
      }
    }
  })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    tracing::debug!(%command, status = ?output.status.code(), "command failed");
    return Err(
      ToolError::Failed {
        command,
        status: output.status.code(),
        stderr,
      }
      .into(),
    );
  }

  Ok(output)
}

/// Run a command and return trimmed stdout
pub fn run_tool_stdout(cmd: &mut Command) -> ReleaseResult<String> {
  let output = run_tool(cmd)?;
  Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
