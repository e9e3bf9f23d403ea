use std::fmt;
use std::error::Error;
use std::ops::Deref;
use std::path::PathBuf;

use super::source::LabelSource;

/// Errors raised while fetching or reading a label resource
#[derive(Debug)]
pub enum LabelError {
    /// Wraps std::io::Error for file operations
    IoError(std::io::Error),
    /// The label file could not be downloaded
    Download(String),
    /// A cached label source was read before it was downloaded
    NotCached(PathBuf),
    /// The resource was readable but held no labels
    Empty,
}

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LabelError::IoError(e) => write!(f, "I/O error: {}", e),
            LabelError::Download(msg) => write!(f, "Failed to download labels: {}", msg),
            LabelError::NotCached(path) => {
                write!(f, "Label file has not been downloaded yet: {}", path.display())
            }
            LabelError::Empty => write!(f, "Label resource contains no labels"),
        }
    }
}

impl Error for LabelError {}

impl From<std::io::Error> for LabelError {
    fn from(err: std::io::Error) -> Self {
        LabelError::IoError(err)
    }
}

impl From<reqwest::Error> for LabelError {
    fn from(err: reqwest::Error) -> Self {
        LabelError::Download(err.to_string())
    }
}

/// Ordered label strings indexed by class.
///
/// Loaded once and shared read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Builds the table from any label source, rejecting empty resources.
    pub fn load(source: &dyn LabelSource) -> Result<Self, LabelError> {
        let labels = source.load()?;
        if labels.is_empty() {
            return Err(LabelError::Empty);
        }
        Ok(Self { labels })
    }

    /// Splits text into labels, one per line. Interior blank lines are kept
    /// so indices stay aligned with the model output.
    pub fn parse(content: &str) -> Vec<String> {
        content.lines().map(|line| line.to_string()).collect()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

impl Deref for LabelTable {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.labels
    }
}
