//! Core engine for driver-release
//!
//! - **config**: run options and `release.toml` parsing and validation
//! - **context**: immutable per-run context and work directory layout
//! - **error**: error types with contextual help messages and exit codes
//! - **exec**: running external tools
//! - **sync**: bring component clones to the tip of their tracking branch
//! - **pin**: check the umbrella out at a tag and components at its revisions
//! - **vcs**: git operations abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod pin;
pub mod sync;
pub mod vcs;
