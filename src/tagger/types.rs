use std::fmt;
use std::error::Error;
use std::path::PathBuf;
use serde::Serialize;

use crate::classifier::ClassifierError;
use crate::embedding::EmbeddingError;
use crate::knn::{DistanceFn, Neighbour};
use crate::report::{Prediction, ReportError};

/// Errors raised along the tagging pipeline
#[derive(Debug)]
pub enum TaggerError {
    /// The input path does not exist or is neither file nor directory
    InvalidInput(PathBuf),
    /// Wraps std::io::Error for directory traversal
    IoError(std::io::Error),
    Classifier(ClassifierError),
    Report(ReportError),
    Embedding(EmbeddingError),
    /// Zero-shot tagging was requested without a word vector model
    NoWordVectors,
    /// None of the registered labels could be placed in vector space
    NoLabels,
}

impl fmt::Display for TaggerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaggerError::InvalidInput(path) => {
                write!(f, "{} is neither a file nor a directory", path.display())
            }
            TaggerError::IoError(e) => write!(f, "I/O error: {}", e),
            TaggerError::Classifier(e) => write!(f, "Classification failed: {}", e),
            TaggerError::Report(e) => write!(f, "Could not rank predictions: {}", e),
            TaggerError::Embedding(e) => write!(f, "Embedding failed: {}", e),
            TaggerError::NoWordVectors => write!(f, "No word vector model loaded"),
            TaggerError::NoLabels => {
                write!(f, "None of the registered labels are known to the word vector model")
            }
        }
    }
}

impl Error for TaggerError {}

impl From<std::io::Error> for TaggerError {
    fn from(err: std::io::Error) -> Self {
        TaggerError::IoError(err)
    }
}

impl From<ClassifierError> for TaggerError {
    fn from(err: ClassifierError) -> Self {
        TaggerError::Classifier(err)
    }
}

impl From<ReportError> for TaggerError {
    fn from(err: ReportError) -> Self {
        TaggerError::Report(err)
    }
}

impl From<EmbeddingError> for TaggerError {
    fn from(err: EmbeddingError) -> Self {
        TaggerError::Embedding(err)
    }
}

/// Knobs for a tagging run
#[derive(Debug, Clone, Copy)]
pub struct TaggerOptions {
    /// How many classifier predictions feed the image embedding
    pub top_k: usize,
    /// How many registered labels to return per image
    pub neighbours: usize,
    /// Return the classifier report without zero-shot tagging
    pub raw_classifier_results: bool,
    /// Keep only predictions scoring above this; overrides `top_k`
    pub confidence: Option<f32>,
    pub distance: DistanceFn,
}

/// The outcome of tagging one image
#[derive(Debug, Clone, Serialize)]
pub struct TaggedImage {
    pub filename: PathBuf,
    /// Top-k classifier predictions
    pub predictions: Vec<Prediction>,
    /// Nearest registered labels; empty in raw mode
    pub tags: Vec<Neighbour>,
}
