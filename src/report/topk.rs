use std::cmp::Ordering;
use ndarray::ArrayView2;
use tracing::debug;

use super::types::{Prediction, ReportError, ScoredIndex};

/// Orders two scored indices by score descending, then by index ascending.
///
/// NaN scores rank below every real score so a broken model output can
/// never push a class to the top of the report.
fn rank(a: &ScoredIndex, b: &ScoredIndex) -> Ordering {
    let by_score = match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    };
    by_score.then_with(|| a.index.cmp(&b.index))
}

/// Selects the `k` highest scoring classes of a probability vector.
///
/// The result holds exactly `k` entries sorted by score descending. Equal
/// scores keep ascending index order, so the output is deterministic for
/// any input.
///
/// # Errors
/// * `EmptyProbabilities` if `probabilities` is empty
/// * `InvalidK` if `k` is zero
/// * `KExceedsVocabulary` if `k` is larger than the vector
pub fn top_k(probabilities: &[f32], k: usize) -> Result<Vec<ScoredIndex>, ReportError> {
    if probabilities.is_empty() {
        return Err(ReportError::EmptyProbabilities);
    }
    if k == 0 {
        return Err(ReportError::InvalidK);
    }
    if k > probabilities.len() {
        return Err(ReportError::KExceedsVocabulary {
            k,
            classes: probabilities.len(),
        });
    }

    let mut scored: Vec<ScoredIndex> = probabilities
        .iter()
        .enumerate()
        .map(|(index, &score)| ScoredIndex { index, score })
        .collect();

    // rank() is a total order, so partitioning first and sorting the head
    // yields the same result as a full stable sort.
    if k < scored.len() {
        scored.select_nth_unstable_by(k - 1, rank);
        scored.truncate(k);
    }
    scored.sort_by(rank);

    Ok(scored)
}

/// Ranks `probabilities` and maps the `k` best classes to their labels.
///
/// # Arguments
/// * `probabilities` - Model output, one score per class index
/// * `labels` - Label table indexed by class
/// * `k` - Number of entries to report
///
/// # Errors
/// Propagates every `top_k` error. Fails with `EmptyLabels` when the table
/// is empty and `LabelOutOfRange` when a selected class has no label.
pub fn report(
    probabilities: &[f32],
    labels: &[String],
    k: usize,
) -> Result<Vec<Prediction>, ReportError> {
    if labels.is_empty() {
        return Err(ReportError::EmptyLabels);
    }

    let selected = top_k(probabilities, k)?;
    debug!("Selected {} of {} classes", selected.len(), probabilities.len());

    selected
        .into_iter()
        .map(|entry| {
            labels
                .get(entry.index)
                .map(|label| Prediction::new(label.clone(), entry.score))
                .ok_or(ReportError::LabelOutOfRange {
                    index: entry.index,
                    labels: labels.len(),
                })
        })
        .collect()
}

/// Reports the first row of a `batch x classes` prediction matrix.
///
/// Classifiers always return a batch; the single image case only ever
/// reads row 0.
pub fn report_batch(
    batch: ArrayView2<'_, f32>,
    labels: &[String],
    k: usize,
) -> Result<Vec<Prediction>, ReportError> {
    if batch.nrows() == 0 {
        return Err(ReportError::EmptyBatch);
    }
    let row: Vec<f32> = batch.row(0).iter().copied().collect();
    report(&row, labels, k)
}

/// Numerically stable softmax over raw logits.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    exps.into_iter().map(|x| x / sum).collect()
}

/// Formats a prediction the way it is printed on the console: `<label> <score>`
pub fn format_line(prediction: &Prediction) -> String {
    format!("{} {}", prediction.label, prediction.score)
}
