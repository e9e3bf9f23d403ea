//! # Label Store
//!
//! The set of labels a user registered for zero-shot tagging. Labels are
//! stored as plain words (or WordNet synset ids) rather than vectors, so the
//! word vector model can be swapped without re-registering anything.

use std::fmt;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc, serde::ts_seconds};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

mod synsets;

pub use synsets::SynsetMap;

static SYNSET_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^n[0-9]{8}$").expect("synset id pattern is valid")
});

/// Errors raised while reading, writing or updating the label store
#[derive(Debug)]
pub enum StoreError {
    /// Wraps std::io::Error for file operations
    IoError(std::io::Error),
    /// The store file is not valid JSON
    Corrupt(String),
    /// The label is empty after trimming
    InvalidLabel(String),
    /// A synset id that the synset mapping does not know
    UnknownSynset(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "I/O error: {}", e),
            StoreError::Corrupt(msg) => write!(f, "Label store is corrupt: {}", msg),
            StoreError::InvalidLabel(label) => write!(f, "Invalid label: {:?}", label),
            StoreError::UnknownSynset(id) => write!(
                f,
                "Synset {} not found, check the synset mapping matches your WordNet version",
                id
            ),
        }
    }
}

impl Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// A registered label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredLabel {
    pub label: String,
    /// Whether the label is a WordNet synset id such as `n02084071`
    pub synset: bool,
    /// When the label was registered
    #[serde(with = "ts_seconds")]
    pub added_date: DateTime<Utc>,
}

/// Returns true for WordNet noun synset ids (`n` followed by eight digits).
pub fn is_synset_id(label: &str) -> bool {
    SYNSET_ID.is_match(label)
}

/// JSON backed list of registered labels, in registration order
#[derive(Debug)]
pub struct LabelStore {
    path: PathBuf,
    labels: Vec<StoredLabel>,
}

impl LabelStore {
    /// Opens the store at `path`. A missing file yields an empty store that
    /// is created on the first `save`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        info!("Loading label store from {}", path.display());

        if !path.exists() {
            info!("Label store does not exist, starting with an empty store");
            return Ok(Self { path, labels: Vec::new() });
        }

        let content = fs::read_to_string(&path)?;
        let labels: Vec<StoredLabel> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&content)?
        };
        info!("Label store loaded with {} labels", labels.len());

        Ok(Self { path, labels })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registers a label. Returns false if it was already present.
    pub fn add(&mut self, label: &str) -> Result<bool, StoreError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(StoreError::InvalidLabel(label.to_string()));
        }
        if self.contains(label) {
            return Ok(false);
        }

        self.labels.push(StoredLabel {
            label: label.to_string(),
            synset: is_synset_id(label),
            added_date: Utc::now(),
        });
        Ok(true)
    }

    /// Registers a label, refusing synset ids that cannot be resolved to
    /// words. Without a mapping no synset id can be resolved.
    pub fn register(&mut self, label: &str, synsets: Option<&SynsetMap>) -> Result<bool, StoreError> {
        let trimmed = label.trim();
        if is_synset_id(trimmed) && synsets.and_then(|s| s.lemmas(trimmed)).is_none() {
            return Err(StoreError::UnknownSynset(trimmed.to_string()));
        }
        self.add(label)
    }

    /// Removes a label. Returns false if it was not registered.
    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l.label != label.trim());
        self.labels.len() != before
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.label == label)
    }

    pub fn labels(&self) -> &[StoredLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Writes the store back to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.labels)?;
        fs::write(&self.path, content)?;
        info!("Label store written with {} labels", self.labels.len());
        Ok(())
    }
}
