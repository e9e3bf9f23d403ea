use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::types::{LabelError, LabelTable};

/// Anything that can hand out an ordered list of class labels.
pub trait LabelSource: Send + Sync {
    fn load(&self) -> Result<Vec<String>, LabelError>;
}

/// Reads labels from a local text file, one label per line
pub struct FileLabelSource {
    path: PathBuf,
}

impl FileLabelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LabelSource for FileLabelSource {
    fn load(&self) -> Result<Vec<String>, LabelError> {
        info!("Loading labels from {}", self.path.display());
        let content = fs::read_to_string(&self.path)?;
        let labels = LabelTable::parse(&content);
        info!("Loaded {} labels", labels.len());
        Ok(labels)
    }
}

/// Labels held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticLabelSource {
    labels: Vec<String>,
}

impl StaticLabelSource {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

impl LabelSource for StaticLabelSource {
    fn load(&self) -> Result<Vec<String>, LabelError> {
        Ok(self.labels.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_source_keeps_line_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "background\ntench\r\n\ngoldfish\n").unwrap();

        let labels = FileLabelSource::new(file.path()).load().unwrap();
        assert_eq!(labels, vec!["background", "tench", "", "goldfish"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FileLabelSource::new("/definitely/not/here.txt").load().unwrap_err();
        assert!(matches!(err, LabelError::IoError(_)));
    }

    #[test]
    fn test_table_rejects_empty_source() {
        let source = StaticLabelSource::new(Vec::<String>::new());
        assert!(matches!(LabelTable::load(&source), Err(LabelError::Empty)));
    }

    #[test]
    fn test_table_from_static_source() {
        let table = LabelTable::load(&StaticLabelSource::new(["cat", "dog"])).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1), Some("dog"));
        assert_eq!(table.get(2), None);
    }
}
