//! Vector similarity helpers.

use crate::error::QuizError;

/// Cosine similarity of two vectors, in `[-1, 1]`.
///
/// Returns `0.0` when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, QuizError> {
    if a.len() != b.len() {
        return Err(QuizError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// Cosine similarity clamped to `[0, 1]`, the range grading works in.
pub fn similarity_score(a: &[f32], b: &[f32]) -> Result<f64, QuizError> {
    Ok(cosine_similarity(a, b)?.max(0.0))
}

/// Average a sequence of equal-length vectors (e.g. per-token embeddings)
/// into one. Returns an empty vector for empty input.
pub fn mean_pool(rows: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut sum = vec![0.0f64; first.len()];
    for row in rows {
        for (acc, &v) in sum.iter_mut().zip(row) {
            *acc += f64::from(v);
        }
    }
    let n = rows.len() as f64;
    sum.into_iter().map(|v| (v / n) as f32).collect()
}
