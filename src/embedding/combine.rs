use tracing::debug;

use crate::report::Prediction;
use super::types::{EmbeddingError, WordEmbedding};

/// Looks a class label up in the embedding vocabulary.
///
/// Class labels are often synonym lists (`"tench, Tinca tinca"`) or multi
/// word names (`"great white shark"`), so each synonym is tried as written
/// and with spaces joined by underscores.
pub fn embed_label(embedding: &dyn WordEmbedding, label: &str) -> Option<Vec<f32>> {
    find_label(embedding, label).map(|(_, vector)| vector)
}

/// Like [`embed_label`], but also returns the vocabulary word that matched.
pub fn find_label(embedding: &dyn WordEmbedding, label: &str) -> Option<(String, Vec<f32>)> {
    if let Some(v) = embedding.embed(label) {
        return Some((label.to_string(), v));
    }
    label
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .find_map(|synonym| {
            let joined = synonym.replace(' ', "_");
            embedding
                .embed(synonym)
                .map(|v| (synonym.to_string(), v))
                .or_else(|| embedding.embed(&joined).map(|v| (joined, v)))
        })
}

/// Embeds an image as the score weighted average of its predicted labels'
/// word vectors.
///
/// Labels missing from the vocabulary are skipped and do not count towards
/// the normaliser.
pub fn convex_combination(
    predictions: &[Prediction],
    embedding: &dyn WordEmbedding,
) -> Result<Vec<f32>, EmbeddingError> {
    let mut combined = vec![0.0f32; embedding.dim()];
    let mut total = 0.0f32;
    let mut embedded = 0usize;

    for prediction in predictions {
        let Some(vector) = embed_label(embedding, &prediction.label) else {
            debug!("No word vector for label {}", prediction.label);
            continue;
        };
        for (acc, v) in combined.iter_mut().zip(vector.iter()) {
            *acc += v * prediction.score;
        }
        total += prediction.score;
        embedded += 1;
    }

    if embedded == 0 {
        return Err(EmbeddingError::NothingEmbedded);
    }
    if total == 0.0 {
        return Err(EmbeddingError::ZeroWeight);
    }

    let scale = 1.0 / total;
    combined.iter_mut().for_each(|v| *v *= scale);
    Ok(combined)
}
