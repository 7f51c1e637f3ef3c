//! Test utilities for batch pipeline testing

use crate::app::models::GeneratedArtifact;
use crate::app::services::batch_pipeline::{ArtifactSink, BatchStats, ProgressObserver};
use crate::{Error, Result};

// Test modules
mod direct_tests;

/// Progress observer that records every notification
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub started_with: Option<usize>,
    pub positions: Vec<usize>,
    pub finished: Option<BatchStats>,
}

impl ProgressObserver for RecordingProgress {
    fn on_start(&mut self, total_rows: usize) {
        self.started_with = Some(total_rows);
    }

    fn on_row(&mut self, attempted: usize, _total_rows: usize) {
        self.positions.push(attempted);
    }

    fn on_finish(&mut self, stats: &BatchStats) {
        self.finished = Some(stats.clone());
    }
}

/// Sink that rejects artifacts for recipients without an `@` in their address
/// and fails hard after a configurable number of writes
#[derive(Debug, Default)]
pub struct PickySink {
    pub accepted: Vec<String>,
    pub fail_after: Option<usize>,
}

impl ArtifactSink for PickySink {
    fn persist(&mut self, artifact: &GeneratedArtifact) -> Result<()> {
        if self.fail_after == Some(self.accepted.len()) {
            return Err(Error::io_error("disk full"));
        }
        match artifact.recipient_email.as_deref() {
            Some(address) if !address.contains('@') => Err(Error::invalid_address(
                address,
                "missing @",
            )),
            _ => {
                self.accepted.push(artifact.file_name.clone());
                Ok(())
            }
        }
    }

    fn finish(&mut self) -> Result<Option<String>> {
        Ok(Some("memory".to_string()))
    }
}
