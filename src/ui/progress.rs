//! Progress indicators for long-running operations
//!
//! Uses `linya` for allocation-free progress bars. Bars draw to stderr so
//! stdout stays clean for status lines.

use linya::{Bar, Progress};

/// Progress bar for per-component work (synchronizing, pinning)
pub struct ComponentProgress {
  progress: Progress,
  bar: Bar,
}

impl ComponentProgress {
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}
