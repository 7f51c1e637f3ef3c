//! Progress reporting for batch runs
//!
//! The pipeline reports through [`ProgressObserver`] after every attempted row
//! so that a cooperative caller can redraw between rows. [`ProgressReporter`]
//! is the terminal implementation backed by an `indicatif` progress bar.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::stats::BatchStats;

/// Receives progress notifications from the pipeline
pub trait ProgressObserver {
    /// Called once before the first row
    fn on_start(&mut self, _total_rows: usize) {}

    /// Called after every attempted row; `attempted` grows by one each call
    fn on_row(&mut self, _attempted: usize, _total_rows: usize) {}

    /// Called once when the batch ends normally or by cancellation
    fn on_finish(&mut self, _stats: &BatchStats) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Progress reporter for terminal output
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    label: String,
}

impl ProgressReporter {
    /// Create a reporter; a disabled reporter never draws anything
    pub fn new(enabled: bool, label: impl Into<String>) -> Self {
        Self {
            progress_bar: enabled.then(ProgressBar::hidden),
            label: label.into(),
        }
    }
}

impl ProgressObserver for ProgressReporter {
    fn on_start(&mut self, total_rows: usize) {
        if self.progress_bar.is_none() {
            return;
        }

        let pb = ProgressBar::new(total_rows as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%) | {msg}",
        ) {
            pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        pb.set_message(self.label.clone());

        debug!("Progress bar initialized for {} rows", total_rows);
        self.progress_bar = Some(pb);
    }

    fn on_row(&mut self, attempted: usize, _total_rows: usize) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(attempted as u64);
        }
    }

    fn on_finish(&mut self, stats: &BatchStats) {
        if let Some(ref pb) = self.progress_bar {
            let message = format!(
                "Completed: {} signatures, {} skipped",
                stats.artifacts_generated, stats.rows_skipped
            );
            pb.finish_with_message(message.clone());
            debug!("Progress reporting completed: {}", message);
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        // Ensure progress bar is finished when reporter is dropped
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

/// Create a simple spinner progress bar for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
    {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_reporter_draws_nothing() {
        let mut reporter = ProgressReporter::new(false, "Generating");
        reporter.on_start(3);
        reporter.on_row(1, 3);
        reporter.on_finish(&BatchStats::new(3));
        assert!(reporter.progress_bar.is_none());
    }

    #[test]
    fn test_enabled_reporter_tracks_position() {
        let mut reporter = ProgressReporter::new(true, "Generating");
        reporter.on_start(3);
        reporter.on_row(1, 3);
        reporter.on_row(2, 3);

        let pb = reporter.progress_bar.clone().unwrap();
        assert_eq!(pb.position(), 2);
        assert_eq!(pb.length(), Some(3));
        reporter.on_finish(&BatchStats::new(3));
        assert!(pb.is_finished());
    }
}
