//! Tests for command-line validation and exit codes

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_missing_token_exits_with_config_code() -> Result<()> {
  let work = tempfile::tempdir()?;
  let output = run_driver_release(work.path(), &["--choice", "build"])?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("--access-token"));
  assert!(stderr.contains("GITHUB_TOKEN"));
  Ok(())
}

#[test]
fn test_missing_choice_exits_with_config_code() -> Result<()> {
  let work = tempfile::tempdir()?;
  let output = run_driver_release(work.path(), &["--access-token", "ghp_test"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("--choice"));
  Ok(())
}

#[test]
fn test_validation_runs_before_work_dir_is_touched() -> Result<()> {
  let work = tempfile::tempdir()?;
  let target = work.path().join("not-yet-created");
  let output = run_driver_release(work.path(), &["-w", &target.display().to_string(), "-c", "release"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(!target.exists());
  Ok(())
}

#[test]
fn test_invalid_choice_is_rejected() -> Result<()> {
  let work = tempfile::tempdir()?;
  let output = run_driver_release(work.path(), &["-a", "ghp_test", "-c", "deploy"])?;

  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("deploy"));
  Ok(())
}

#[test]
fn test_non_github_target_is_rejected() -> Result<()> {
  let work = tempfile::tempdir()?;
  let output = run_driver_release(work.path(), &["-a", "ghp_test", "-c", "build", "-t", "/srv/mirrors"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("GitHub owner"));
  Ok(())
}

#[test]
fn test_malformed_config_file() -> Result<()> {
  let work = tempfile::tempdir()?;
  std::fs::write(work.path().join("release.toml"), "components = 3\n")?;
  let output = run_driver_release(work.path(), &["-a", "ghp_test", "-c", "build"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("release.toml"));
  Ok(())
}

#[test]
fn test_umbrella_outside_source_dir_is_rejected() -> Result<()> {
  let work = tempfile::tempdir()?;
  std::fs::write(work.path().join("release.toml"), "umbrella = \"..\"\n")?;
  std::fs::write(work.path().join("amdvlk_2023.Q3.1_amd64.deb"), "deb")?;
  let output = run_driver_release(work.path(), &["-a", "ghp_test", "-c", "build"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("not a valid repository name"));
  assert!(work.path().join("amdvlk_2023.Q3.1_amd64.deb").exists());
  Ok(())
}
