//! Batch statistics and result structures
//!
//! This module provides types for tracking how a batch went and for handing
//! its artifacts and diagnostics to export collaborators.

use crate::app::models::{Diagnostic, GeneratedArtifact, ValidationResult};

/// Statistics for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Data rows the batch will attempt (accepted plus rejected)
    pub rows_total: usize,
    /// Rows attempted so far, including skipped ones
    pub rows_attempted: usize,
    /// Artifacts rendered and persisted
    pub artifacts_generated: usize,
    /// Rows skipped by the width policy or rejected by the sink
    pub rows_skipped: usize,
    /// Whether the batch stopped early on cancellation
    pub cancelled: bool,
}

impl BatchStats {
    pub fn new(rows_total: usize) -> Self {
        Self {
            rows_total,
            ..Default::default()
        }
    }

    /// Calculate success rate as a percentage of attempted rows
    pub fn success_rate(&self) -> f64 {
        if self.rows_attempted == 0 {
            0.0
        } else {
            (self.artifacts_generated as f64 / self.rows_attempted as f64) * 100.0
        }
    }

    /// Get summary of batch statistics
    pub fn summary(&self) -> String {
        format!(
            "Batch Summary: {}/{} rows attempted -> {} signatures ({:.1}% success) | Skipped: {}{}",
            self.rows_attempted,
            self.rows_total,
            self.artifacts_generated,
            self.success_rate(),
            self.rows_skipped,
            if self.cancelled { " | Cancelled" } else { "" }
        )
    }
}

/// Everything a batch produced
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Generated artifacts in row order
    pub artifacts: Vec<GeneratedArtifact>,

    /// Diagnostics in emission order
    pub diagnostics: Vec<Diagnostic>,

    /// Validation outcome (`NotAttempted` for single-brace templates)
    pub validation: ValidationResult,

    /// Where the sink put the artifacts, if it said
    pub target: Option<String>,

    pub stats: BatchStats,
}

impl BatchReport {
    pub(crate) fn new(validation: ValidationResult) -> Self {
        Self {
            artifacts: Vec::new(),
            diagnostics: Vec::new(),
            validation,
            target: None,
            stats: BatchStats::default(),
        }
    }

    /// Messages without timestamps, in emission order
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    /// True when validation blocked the batch
    pub fn is_blocked(&self) -> bool {
        matches!(self.validation, ValidationResult::Invalid { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        self.stats.cancelled
    }
}
