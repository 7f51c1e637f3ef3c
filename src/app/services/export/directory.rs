//! Directory export: one HTML file per artifact

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::app::models::GeneratedArtifact;
use crate::app::services::batch_pipeline::ArtifactSink;
use crate::constants::OUTPUT_DIR_PREFIX;
use crate::{Error, Result};

/// Writes each artifact to `<dir>/<file_name>` as UTF-8 without BOM
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Use `dir`, creating it when needed
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            Error::io(format!("Failed to create output directory {}", dir.display()), e)
        })?;
        info!("Writing signatures to {}", dir.display());

        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    /// Fresh `signatures_YYYYMMDD_HHMMSS` directory under `parent`
    pub fn timestamped(parent: &Path) -> Result<Self> {
        Self::create(parent.join(timestamped_dir_name()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

/// Directory name for a timestamped export
pub fn timestamped_dir_name() -> String {
    format!("{}{}", OUTPUT_DIR_PREFIX, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write `bytes` to `dir/file_name` through a temporary file in the same directory
///
/// The target either appears complete or not at all.
pub fn write_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let target = dir.join(file_name);

    let mut temp_file = NamedTempFile::new_in(dir)
        .map_err(|e| Error::io(format!("Failed to create temp file in {}", dir.display()), e))?;
    temp_file
        .write_all(bytes)
        .and_then(|()| temp_file.as_file().sync_all())
        .map_err(|e| Error::io(format!("Failed to write {}", target.display()), e))?;
    temp_file
        .persist(&target)
        .map_err(|e| Error::io(format!("Failed to move {} into place", target.display()), e.error))?;

    Ok(target)
}

impl ArtifactSink for DirectorySink {
    fn existing_names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::io(
                    format!("Failed to list {}", self.dir.display()),
                    e,
                ));
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        debug!("{} existing entries in {}", names.len(), self.dir.display());
        Ok(names)
    }

    fn persist(&mut self, artifact: &GeneratedArtifact) -> Result<()> {
        let path = write_atomically(&self.dir, &artifact.file_name, artifact.content.as_bytes())?;
        debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }

    fn finish(&mut self) -> Result<Option<String>> {
        Ok(Some(self.dir.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn artifact(file_name: &str, content: &str) -> GeneratedArtifact {
        GeneratedArtifact {
            row_number: 2,
            recipient_name: Some("Ann".to_string()),
            recipient_email: None,
            content: content.to_string(),
            file_name: file_name.to_string(),
        }
    }

    #[test]
    fn test_persist_writes_utf8_without_bom() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::create(temp_dir.path().join("out")).unwrap();

        sink.persist(&artifact("Zoë.html", "<p>Zoë</p>")).unwrap();

        let bytes = fs::read(temp_dir.path().join("out").join("Zoë.html")).unwrap();
        assert_eq!(bytes, "<p>Zoë</p>".as_bytes());
        assert_eq!(sink.written().len(), 1);
    }

    #[test]
    fn test_existing_names_lists_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Ann.html"), "old").unwrap();
        let sink = DirectorySink::create(temp_dir.path()).unwrap();

        assert_eq!(sink.existing_names().unwrap(), vec!["Ann.html".to_string()]);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::create(temp_dir.path()).unwrap();
        sink.persist(&artifact("a.html", "a")).unwrap();
        sink.persist(&artifact("b.html", "b")).unwrap();

        let mut names = sink.existing_names().unwrap();
        names.sort();
        assert_eq!(names, vec!["a.html", "b.html"]);
    }

    #[test]
    fn test_timestamped_directory_name() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::timestamped(temp_dir.path()).unwrap();

        let name = sink.dir().file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with(OUTPUT_DIR_PREFIX));
        assert_eq!(name.len(), OUTPUT_DIR_PREFIX.len() + 15);
        assert_eq!(
            sink.finish().unwrap(),
            Some(sink.dir().display().to_string())
        );
    }
}
