//! Cosine similarity and nearest-neighbour lookup over embeddings.

/// Below this similarity the query is reported as an unknown bread type.
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// `dot(a, b) / (|a| * |b|)`, in `[-1, 1]`.
///
/// Both vectors come from the same backbone and must have the same length. A
/// zero vector has no direction, so its similarity to anything is 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "embedding length mismatch");
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0) as f32
}

/// Index and similarity of the candidate closest to `query`.
///
/// Ties resolve to the earliest candidate. `None` when there are no candidates.
pub fn best_match<'a, I>(query: &[f32], candidates: I) -> Option<(usize, f32)>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut best: Option<(usize, f32)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        let sim = cosine_similarity(query, candidate);
        match best {
            Some((_, best_sim)) if sim <= best_sim => {}
            _ => best = Some((idx, sim)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_similarity_is_one() {
        let v = [0.3, -1.2, 4.5, 0.0, 2.2];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = [1.0, 2.0, 3.0];
        let b = [-0.5, 4.0, 0.25];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn ignores_magnitude() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0, 30.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        let neg = [-2.0, -4.0, -6.0];
        assert!((cosine_similarity(&a, &neg) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_and_zero_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn best_match_prefers_first_of_equal_candidates() {
        let refs: Vec<Vec<f32>> = vec![vec![0.0, 1.0], vec![2.0, 0.0], vec![4.0, 0.0]];
        let (idx, sim) = best_match(&[1.0, 0.0], refs.iter().map(|v| v.as_slice())).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(sim, 1.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "embedding length mismatch")]
    fn mismatched_lengths_are_rejected() {
        cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
    }

    #[test]
    fn best_match_of_nothing_is_none() {
        assert!(best_match(&[1.0], std::iter::empty()).is_none());
    }
}
