use std::cmp::Ordering;
use rayon::prelude::*;
use serde::Serialize;

use super::distance::DistanceFn;

/// A label placed in word vector space
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedLabel {
    pub label: String,
    pub vector: Vec<f32>,
}

impl EmbeddedLabel {
    pub fn new(label: impl Into<String>, vector: Vec<f32>) -> Self {
        Self { label: label.into(), vector }
    }
}

/// One search hit: the label and how far it is from the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbour {
    pub label: String,
    pub distance: f32,
}

/// Finds the `k` labels closest to each target vector.
///
/// Results per target are sorted by ascending distance, ties by position in
/// `space`. When `k` exceeds the size of the space the whole space is
/// returned. Targets are searched in parallel.
pub fn knn_search(
    space: &[EmbeddedLabel],
    targets: &[Vec<f32>],
    k: usize,
    distance: DistanceFn,
) -> Vec<Vec<Neighbour>> {
    targets
        .par_iter()
        .map(|target| {
            let mut distances: Vec<(usize, f32)> = space
                .iter()
                .enumerate()
                .map(|(i, entry)| (i, distance(&entry.vector, target)))
                .collect();

            distances.sort_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or_else(|| a.1.is_nan().cmp(&b.1.is_nan()))
                    .then_with(|| a.0.cmp(&b.0))
            });
            distances.truncate(k);

            distances
                .into_iter()
                .map(|(i, d)| Neighbour {
                    label: space[i].label.clone(),
                    distance: d,
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knn::distance::{cosine, euclidean};

    fn space() -> Vec<EmbeddedLabel> {
        vec![
            EmbeddedLabel::new("east", vec![1.0, 0.0]),
            EmbeddedLabel::new("north", vec![0.0, 1.0]),
            EmbeddedLabel::new("north-east", vec![1.0, 1.0]),
            EmbeddedLabel::new("west", vec![-1.0, 0.0]),
        ]
    }

    #[test]
    fn test_nearest_first() {
        let result = knn_search(&space(), &[vec![0.9, 0.1]], 2, cosine);
        let labels: Vec<&str> = result[0].iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["east", "north-east"]);
        assert!(result[0][0].distance <= result[0][1].distance);
    }

    #[test]
    fn test_multiple_targets() {
        let result = knn_search(&space(), &[vec![0.0, 2.0], vec![-3.0, 0.0]], 1, euclidean);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0][0].label, "north");
        assert_eq!(result[1][0].label, "west");
    }

    #[test]
    fn test_k_larger_than_space() {
        let result = knn_search(&space(), &[vec![1.0, 0.0]], 10, euclidean);
        assert_eq!(result[0].len(), 4);
    }

    #[test]
    fn test_ties_keep_space_order() {
        // east and north are both at distance 1
        let result = knn_search(&space(), &[vec![1.0, 1.0]], 3, euclidean);
        let labels: Vec<&str> = result[0].iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["north-east", "east", "north"]);
    }
}
