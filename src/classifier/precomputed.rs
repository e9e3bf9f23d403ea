use std::fs;
use std::path::Path;
use ndarray::Array2;
use serde::Deserialize;
use tracing::{info, debug};

use crate::report::softmax;
use super::types::{Classifier, ClassifierError};

/// Accepted layouts for exported model output
#[derive(Deserialize)]
#[serde(untagged)]
enum ExportedOutput {
    /// TensorFlow Serving style response
    Serving { predictions: Vec<Vec<f32>> },
    Batch(Vec<Vec<f32>>),
    Single(Vec<f32>),
}

/// Reads model output that an external runner exported to JSON.
///
/// The file may hold a single vector, a batch of vectors, or a
/// `{"predictions": [[...]]}` document. When the runner exported raw logits
/// every row is passed through softmax.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedClassifier {
    logits: bool,
}

impl PrecomputedClassifier {
    pub fn new(logits: bool) -> Self {
        Self { logits }
    }

    /// Parses exported output into a `batch x classes` matrix.
    pub fn parse(&self, content: &str) -> Result<Array2<f32>, ClassifierError> {
        let rows = match serde_json::from_str::<ExportedOutput>(content)? {
            ExportedOutput::Serving { predictions } => predictions,
            ExportedOutput::Batch(rows) => rows,
            ExportedOutput::Single(row) => vec![row],
        };

        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if width == 0 {
            return Err(ClassifierError::InvalidOutput("no predictions found".to_string()));
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(ClassifierError::InvalidOutput(format!(
                "rows differ in width ({} and {})",
                width,
                bad.len()
            )));
        }

        let height = rows.len();
        let flat: Vec<f32> = rows
            .into_iter()
            .flat_map(|row| if self.logits { softmax(&row) } else { row })
            .collect();

        Array2::from_shape_vec((height, width), flat)
            .map_err(|e| ClassifierError::InvalidOutput(e.to_string()))
    }
}

impl Classifier for PrecomputedClassifier {
    fn predict(&self, input: &Path) -> Result<Array2<f32>, ClassifierError> {
        info!("Reading exported predictions from {}", input.display());
        let content = fs::read_to_string(input)?;
        let predictions = self.parse(&content)?;
        debug!("Prediction shape: {:?}", predictions.shape());
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layouts() {
        let classifier = PrecomputedClassifier::new(false);

        let single = classifier.parse("[0.1, 0.9]").unwrap();
        assert_eq!(single.shape(), &[1, 2]);

        let batch = classifier.parse("[[0.1, 0.9], [0.5, 0.5]]").unwrap();
        assert_eq!(batch.shape(), &[2, 2]);

        let serving = classifier.parse(r#"{"predictions": [[0.2, 0.3, 0.5]]}"#).unwrap();
        assert_eq!(serving[[0, 2]], 0.5);
    }

    #[test]
    fn test_parse_logits_applies_softmax() {
        let classifier = PrecomputedClassifier::new(true);
        let probs = classifier.parse("[[0.0, 0.0]]").unwrap();
        assert!((probs[[0, 0]] - 0.5).abs() < 1e-6);
        assert!((probs[[0, 1]] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_parse_rejects_ragged_and_empty() {
        let classifier = PrecomputedClassifier::new(false);
        assert!(classifier.parse("[[0.1, 0.9], [1.0]]").is_err());
        assert!(classifier.parse("[]").is_err());
        assert!(classifier.parse("not json").is_err());
    }

    #[test]
    fn test_predict_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "[0.25, 0.75]").unwrap();

        let predictions = PrecomputedClassifier::default().predict(&path).unwrap();
        assert_eq!(predictions[[0, 1]], 0.75);
    }
}
