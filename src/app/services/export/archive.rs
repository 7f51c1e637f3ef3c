//! ZIP export: all artifacts in one deflated archive

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::app::models::GeneratedArtifact;
use crate::app::services::batch_pipeline::ArtifactSink;
use crate::{Error, Result};

/// Streams artifacts into a ZIP archive
///
/// The archive is assembled in a temporary file next to the target and only
/// moved into place by [`ArtifactSink::finish`], replacing any previous
/// archive. Dropping the sink before `finish` leaves the target untouched.
pub struct ArchiveSink {
    path: PathBuf,
    writer: Option<ZipWriter<NamedTempFile>>,
    entries: usize,
}

impl ArchiveSink {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| {
            Error::io(format!("Failed to create directory {}", parent.display()), e)
        })?;

        let temp_file = NamedTempFile::new_in(&parent).map_err(|e| {
            Error::io(format!("Failed to create temp file in {}", parent.display()), e)
        })?;
        info!("Building archive {}", path.display());

        Ok(Self {
            path,
            writer: Some(ZipWriter::new(temp_file)),
            entries: 0,
        })
    }

    fn writer(&mut self) -> Result<&mut ZipWriter<NamedTempFile>> {
        self.writer
            .as_mut()
            .ok_or_else(|| Error::io_error(format!("Archive {} already finished", self.path.display())))
    }
}

impl std::fmt::Debug for ArchiveSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSink")
            .field("path", &self.path)
            .field("entries", &self.entries)
            .field("finished", &self.writer.is_none())
            .finish()
    }
}

impl ArtifactSink for ArchiveSink {
    fn persist(&mut self, artifact: &GeneratedArtifact) -> Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let writer = self.writer()?;

        writer
            .start_file(artifact.file_name.as_str(), options)
            .map_err(|e| Error::archive(format!("Failed to add {}", artifact.file_name), e))?;
        writer.write_all(artifact.content.as_bytes()).map_err(|e| {
            Error::io(format!("Failed to write archive entry {}", artifact.file_name), e)
        })?;

        self.entries += 1;
        debug!("Added {} to archive", artifact.file_name);
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<String>> {
        let Some(writer) = self.writer.take() else {
            return Ok(Some(self.path.display().to_string()));
        };

        let temp_file = writer
            .finish()
            .map_err(|e| Error::archive(format!("Failed to finish {}", self.path.display()), e))?;
        temp_file.as_file().sync_all().map_err(|e| {
            Error::io(format!("Failed to flush {}", self.path.display()), e)
        })?;
        temp_file.persist(&self.path).map_err(|e| {
            Error::io(format!("Failed to move archive to {}", self.path.display()), e.error)
        })?;

        info!("Archive {} written with {} entries", self.path.display(), self.entries);
        Ok(Some(self.path.display().to_string()))
    }
}
