use std::fmt;
use std::error::Error;
use serde::{Serialize, Deserialize};

/// A class index together with its score, as selected by `top_k`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredIndex {
    /// Position of the class in the probability vector
    pub index: usize,
    /// Score the model assigned to the class
    pub score: f32,
}

/// A single line of a top-k report: a human readable label and its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self { label: label.into(), score }
    }
}

/// Errors produced while ranking and labelling a probability vector
#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    /// The probability vector has no entries
    EmptyProbabilities,
    /// The label table has no entries
    EmptyLabels,
    /// k must be at least 1
    InvalidK,
    /// k is larger than the number of classes
    KExceedsVocabulary { k: usize, classes: usize },
    /// A selected class index has no label; the label resource does not
    /// match the model's output dimensionality
    LabelOutOfRange { index: usize, labels: usize },
    /// A batch was expected to contain at least one row
    EmptyBatch,
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReportError::EmptyProbabilities => write!(f, "probability vector is empty"),
            ReportError::EmptyLabels => write!(f, "label table is empty"),
            ReportError::InvalidK => write!(f, "k must be a positive integer"),
            ReportError::KExceedsVocabulary { k, classes } => {
                write!(f, "k ({}) exceeds the number of classes ({})", k, classes)
            }
            ReportError::LabelOutOfRange { index, labels } => write!(
                f,
                "class index {} has no label (label table holds {} entries)",
                index, labels
            ),
            ReportError::EmptyBatch => write!(f, "prediction batch is empty"),
        }
    }
}

impl Error for ReportError {}
