use clap::Parser;
use driver_release::commands;
use driver_release::core::config::{DEFAULT_TARGET_REPO, Mode, RunOptions};
use driver_release::core::error::{ReleaseError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Build and publish AMDVLK driver packages for new umbrella tags
#[derive(Parser)]
#[command(name = "driver-release")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Work directory holding sources, staging trees and artifacts
  #[arg(short, long, default_value = ".")]
  work_dir: PathBuf,

  /// Access token for the release host
  #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
  access_token: Option<String>,

  /// Root URL (or local directory) the repositories live under
  #[arg(short, long, default_value = DEFAULT_TARGET_REPO)]
  target_repo: String,

  /// Build packages, or publish a release from packages already built
  #[arg(short, long, value_enum)]
  choice: Option<Mode>,

  /// Config file (default: release.toml in the work directory)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Debug logging (RUST_LOG overrides)
  #[arg(short, long)]
  verbose: bool,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "driver_release=debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let options = RunOptions {
    work_dir: cli.work_dir,
    access_token: cli.access_token,
    target_repo: cli.target_repo,
    choice: cli.choice,
  };

  if let Err(err) = commands::run_release(options, cli.config.as_deref()) {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
