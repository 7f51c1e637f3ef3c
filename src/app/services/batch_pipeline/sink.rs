//! Persistence seam between the pipeline and export targets

use crate::Result;
use crate::app::models::GeneratedArtifact;

/// Destination for generated artifacts
///
/// `persist` is called once per rendered row with a fully materialized
/// artifact. Returning a row-level error (see [`crate::Error::is_batch_fatal`])
/// skips that row; any other error aborts the batch.
pub trait ArtifactSink {
    /// File names already present in the target, for collision avoidance
    fn existing_names(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn persist(&mut self, artifact: &GeneratedArtifact) -> Result<()>;

    /// Complete the target and describe where the artifacts went
    fn finish(&mut self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Sink that keeps nothing but the names it was given
///
/// Used for previews and tests where the in-memory report is all that matters.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub existing: Vec<String>,
    pub persisted: Vec<String>,
}

impl MemorySink {
    pub fn with_existing<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            existing: existing.into_iter().map(Into::into).collect(),
            persisted: Vec::new(),
        }
    }
}

impl ArtifactSink for MemorySink {
    fn existing_names(&self) -> Result<Vec<String>> {
        Ok(self.existing.clone())
    }

    fn persist(&mut self, artifact: &GeneratedArtifact) -> Result<()> {
        self.persisted.push(artifact.file_name.clone());
        Ok(())
    }
}
