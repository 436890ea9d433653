//! Pure vector math for semantic matching
//!
//! Raw cosine similarity lives in [-1, 1]; it is remapped to [0, 1] so that
//! relevance and the category bonus can be summed on a common scale.

use uuid::Uuid;

/// Cosine similarity between two vectors, remapped to [0, 1].
///
/// Mismatched lengths are a programming error and fail fast. A zero-magnitude
/// operand yields 0.0 rather than NaN so degenerate vectors never poison the
/// ranking.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "embedding dimensions must match");

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let cos = dot / (norm_a.sqrt() * norm_b.sqrt());

    // Remap [-1, 1] -> [0, 1]; clamp guards floating-point overshoot
    ((cos + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Top-k candidates by remapped cosine similarity against a query vector.
///
/// Candidates without a vector are skipped. The sort is stable and
/// descending, so ties keep insertion order. The result is truncated to `k`.
pub fn top_k(
    query: &[f32],
    candidates: &[(Uuid, Option<Vec<f32>>)],
    k: usize,
) -> Vec<(Uuid, f32)> {
    let mut scored: Vec<(Uuid, f32)> = candidates
        .iter()
        .filter_map(|(id, vector)| {
            vector
                .as_ref()
                .map(|v| (*id, cosine_similarity(query, v)))
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1536-d vector with the given leading components, zero-padded
    fn dim_vec(leading: &[f32]) -> Vec<f32> {
        let mut v = vec![0.0f32; 1536];
        v[..leading.len()].copy_from_slice(leading);
        v
    }

    #[test]
    fn test_self_similarity_is_maximal() {
        let v = dim_vec(&[1.0, 2.0, -3.0]);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_vectors_map_to_floor() {
        let v = dim_vec(&[1.0, 2.0, -3.0]);
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();
        assert!(cosine_similarity(&v, &neg).abs() < 1e-6);
    }

    #[test]
    fn test_symmetry() {
        let a = dim_vec(&[0.3, 0.7, 0.1]);
        let b = dim_vec(&[0.9, -0.2, 0.4]);
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_zero_vector_yields_zero_not_nan() {
        let zero = vec![0.0f32; 1536];
        let v = dim_vec(&[1.0]);
        let score = cosine_similarity(&zero, &v);
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_orthogonal_vectors_map_to_midpoint() {
        let a = dim_vec(&[1.0, 0.0]);
        let b = dim_vec(&[0.0, 1.0]);
        assert!((cosine_similarity(&a, &b) - 0.5).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "embedding dimensions must match")]
    fn test_mismatched_lengths_fail_fast() {
        cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_top_k_skips_absent_and_truncates() {
        let query = dim_vec(&[1.0]);
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        let absent = Uuid::new_v4();
        let mid = Uuid::new_v4();

        let candidates = vec![
            (far, Some(dim_vec(&[-1.0]))),
            (absent, None),
            (near, Some(dim_vec(&[1.0]))),
            (mid, Some(dim_vec(&[1.0, 1.0]))),
        ];

        let ranked = top_k(&query, &candidates, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, near);
        assert_eq!(ranked[1].0, mid);
    }

    #[test]
    fn test_top_k_ties_keep_insertion_order() {
        let query = dim_vec(&[1.0]);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let candidates = vec![
            (first, Some(dim_vec(&[1.0]))),
            (second, Some(dim_vec(&[2.0]))), // same direction, same cosine
        ];

        let ranked = top_k(&query, &candidates, 10);
        assert_eq!(ranked[0].0, first);
        assert_eq!(ranked[1].0, second);
    }
}
