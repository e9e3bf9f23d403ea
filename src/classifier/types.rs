use std::fmt;
use std::error::Error;
use std::path::Path;
use ndarray::Array2;
use serde::Serialize;

use crate::labels::LabelTable;

/// Errors raised by classifiers and the classifier registry
#[derive(Debug)]
pub enum ClassifierError {
    /// Wraps std::io::Error for file operations
    IoError(std::io::Error),
    /// Model output could not be parsed
    InvalidOutput(String),
    /// The output width does not match the model's label count
    ShapeMismatch { expected: usize, actual: usize },
    /// No classifier registered under this name
    UnknownClassifier(String),
    /// The label table does not line up with the model output
    LabelMismatch { expected: usize, actual: usize },
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClassifierError::IoError(e) => write!(f, "I/O error: {}", e),
            ClassifierError::InvalidOutput(msg) => write!(f, "Invalid model output: {}", msg),
            ClassifierError::ShapeMismatch { expected, actual } => write!(
                f,
                "Model output has {} classes, expected {}",
                actual, expected
            ),
            ClassifierError::UnknownClassifier(name) => {
                write!(f, "Classifier {} does not exist", name)
            }
            ClassifierError::LabelMismatch { expected, actual } => write!(
                f,
                "Label table has {} entries but the model predicts {} classes",
                actual, expected
            ),
        }
    }
}

impl Error for ClassifierError {}

impl From<std::io::Error> for ClassifierError {
    fn from(err: std::io::Error) -> Self {
        ClassifierError::IoError(err)
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::InvalidOutput(err.to_string())
    }
}

/// Runs a model on one input and returns its `batch x classes` output.
///
/// Model execution itself lives outside this crate; implementations only
/// need to hand back probabilities.
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &Path) -> Result<Array2<f32>, ClassifierError>;
}

/// Static description of a model the tagger knows how to use
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierDescription {
    /// Name used on the command line
    pub name: &'static str,
    /// Model file, relative to the data directory
    pub model_file: &'static str,
    /// Graph node fed with the image batch
    pub input_tag: &'static str,
    /// Graph node holding the predictions
    pub output_tag: &'static str,
    /// Label file matching the model output
    pub label_file: &'static str,
    /// Leading entries of `label_file` the model has no output for,
    /// e.g. `background` in ImageNetLabels.txt for 1000 class models
    pub skip_labels: usize,
    /// Width of the model output
    pub num_labels: usize,
}

impl ClassifierDescription {
    /// Rejects predictions whose width does not match this model.
    pub fn check_output(&self, predictions: &Array2<f32>) -> Result<(), ClassifierError> {
        if predictions.ncols() != self.num_labels {
            return Err(ClassifierError::ShapeMismatch {
                expected: self.num_labels,
                actual: predictions.ncols(),
            });
        }
        Ok(())
    }

    /// Rejects a label table whose length differs from the model output.
    pub fn check_labels(&self, labels: &LabelTable) -> Result<(), ClassifierError> {
        if labels.len() != self.num_labels {
            return Err(ClassifierError::LabelMismatch {
                expected: self.num_labels,
                actual: labels.len(),
            });
        }
        Ok(())
    }

    /// Lines a label table up with the model output.
    ///
    /// A table that already has one entry per class is kept; a full
    /// `label_file` has its leading `skip_labels` entries dropped. Anything
    /// else would shift every reported class and is rejected.
    pub fn align_labels(&self, labels: LabelTable) -> Result<LabelTable, ClassifierError> {
        if labels.len() == self.num_labels {
            return Ok(labels);
        }
        if self.skip_labels > 0 && labels.len() == self.num_labels + self.skip_labels {
            return Ok(LabelTable::new(labels.as_slice()[self.skip_labels..].to_vec()));
        }
        Err(ClassifierError::LabelMismatch {
            expected: self.num_labels,
            actual: labels.len(),
        })
    }
}
