//! Batch pipeline for signature generation
//!
//! Runs the whole template-fill flow for one template and one data file:
//! table parsing, placeholder extraction and validation, then per-row
//! rendering, naming and persistence. Row-level problems become diagnostics;
//! only I/O and export failures stop the batch.
//!
//! ## Architecture
//!
//! - [`pipeline`] - Orchestration and pipeline configuration
//! - [`sink`] - The [`ArtifactSink`] seam export targets implement
//! - [`progress`] - Progress observation, including an `indicatif` reporter
//! - [`stats`] - Batch statistics and the final report
//!
//! ## Usage
//!
//! ```rust
//! use signature_generator::app::services::batch_pipeline::{
//!     BatchPipeline, MemorySink, NoProgress, PipelineConfig,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # fn example() -> signature_generator::Result<()> {
//! let pipeline = BatchPipeline::new(PipelineConfig::default());
//! let report = pipeline.run(
//!     "Hi {{name}}",
//!     "name\nAnn\n",
//!     &mut MemorySink::default(),
//!     &mut NoProgress,
//!     &CancellationToken::new(),
//! )?;
//!
//! assert_eq!(report.artifacts[0].content, "Hi Ann");
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod progress;
pub mod sink;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use pipeline::{BatchPipeline, PipelineConfig, PreparedBatch};
pub use progress::{NoProgress, ProgressObserver, ProgressReporter};
pub use sink::{ArtifactSink, MemorySink};
pub use stats::{BatchReport, BatchStats};
