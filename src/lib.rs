//! Release automation for the AMD open source Vulkan driver
//!
//! Watches the umbrella repository for a new tag, pins every component to
//! the revisions its manifest records, then builds packages or publishes
//! them as a release.

pub mod build;
pub mod commands;
pub mod core;
pub mod manifest;
pub mod release;
pub mod ui;
pub mod utils;
