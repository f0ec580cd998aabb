//! CLI commands for driver-release
//!
//! - **run**: check the release ledger, then build or publish the newest
//!   umbrella tag

pub mod run;

pub use run::{Capabilities, RunOutcome, execute, run_release};
