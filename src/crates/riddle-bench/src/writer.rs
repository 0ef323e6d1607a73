//! Artifact persistence.

use crate::error::{BenchError, Result};
use crate::task::Task;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes one text file per task into an output directory.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the artifact for `task` lives.
    pub fn artifact_path(&self, task: &Task) -> PathBuf {
        self.output_dir.join(task.artifact_name())
    }

    /// Write `text` as the artifact for `task`, replacing any previous one.
    ///
    /// The directory is created on demand. The file holds exactly `text`.
    pub fn persist(&self, task: &Task, text: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| BenchError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.artifact_path(task);
        std::fs::write(&path, text).map_err(|source| BenchError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(task = %task, path = %path.display(), bytes = text.len(), "Artifact written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Strategy;
    use tempfile::TempDir;

    #[test]
    fn test_persist_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("results");
        let writer = ResultWriter::new(&out);

        let path = writer.persist(&Task::new(Strategy::Raw, 0), "42").unwrap();

        assert_eq!(path, out.join("prompt-raw-result-0.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "42");
    }

    #[test]
    fn test_persist_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(temp_dir.path());
        let task = Task::new(Strategy::RepeatBack, 3);

        writer.persist(&task, "first, and much longer").unwrap();
        let path = writer.persist(&task, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_persist_keeps_text_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(temp_dir.path());
        let text = "Line one\n\n  indented — ünïcode\n";

        let path = writer
            .persist(&Task::new(Strategy::ChainOfThought, 1), text)
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), text.as_bytes());
    }

    #[test]
    fn test_persist_fails_when_directory_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("results");
        std::fs::write(&blocker, "not a directory").unwrap();

        let writer = ResultWriter::new(&blocker);
        let err = writer
            .persist(&Task::new(Strategy::Raw, 0), "42")
            .unwrap_err();

        assert!(matches!(err, BenchError::Io { .. }));
    }
}
