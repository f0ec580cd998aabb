//! Release ledger and publishing
//!
//! - **ledger**: which tags are already published, and whether the newest
//!   umbrella tag needs a run
//! - **host**: the `ReleaseHost` capability and its GitHub REST implementation
//! - **checksums**: `SHA256SUMS` uploaded next to the packages

pub mod checksums;
pub mod host;
pub mod ledger;

pub use host::{CreatedRelease, GitHubHost, NewRelease, ReleaseHost};
pub use ledger::{Decision, ReleaseSet, latest_tag};
