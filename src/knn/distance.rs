/// Distance between two vectors of equal length; smaller means closer
pub type DistanceFn = fn(&[f32], &[f32]) -> f32;

/// `1 - (x . y) / (|x| |y|)`
///
/// A zero vector has no direction and is treated as maximally distant.
pub fn cosine(x: &[f32], y: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_x = 0.0f32;
    let mut norm_y = 0.0f32;
    for (a, b) in x.iter().zip(y) {
        dot += a * b;
        norm_x += a * a;
        norm_y += b * b;
    }

    let norm = norm_x.sqrt() * norm_y.sqrt();
    if norm == 0.0 {
        return 1.0;
    }
    1.0 - dot / norm
}

/// `sum((x_i - y_i)^2 / (x_i + y_i)) / 2`, skipping terms where both are zero
pub fn chi_square(x: &[f32], y: &[f32]) -> f32 {
    x.iter()
        .zip(y)
        .filter(|(a, b)| *a + *b != 0.0)
        .map(|(a, b)| (a - b) * (a - b) / (a + b))
        .sum::<f32>()
        / 2.0
}

/// `sqrt(sum((x_i - y_i)^2))`
pub fn euclidean(x: &[f32], y: &[f32]) -> f32 {
    x.iter()
        .zip(y)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt()
}

/// `sum(|x_i - y_i|)`
pub fn manhattan(x: &[f32], y: &[f32]) -> f32 {
    x.iter().zip(y).map(|(a, b)| (a - b).abs()).sum()
}

/// Resolves a distance function by its configuration name.
pub fn by_name(name: &str) -> Option<DistanceFn> {
    match name.to_lowercase().as_str() {
        "cosine" | "cos" => Some(cosine as DistanceFn),
        "chi2" | "chi_square" => Some(chi_square as DistanceFn),
        "euclidean" => Some(euclidean as DistanceFn),
        "manhattan" => Some(manhattan as DistanceFn),
        _ => None,
    }
}
