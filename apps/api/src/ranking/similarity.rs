//! Similarity Ranker — cosine similarity between a reference embedding and a
//! set of candidate embeddings, sorted into a descending ranked list.

use std::cmp::Ordering;

/// One candidate's similarity to the reference document.
/// The raw cosine value lives in [-1, 1]; `as_percentage` is the display
/// form used for match scores.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityScore {
    pub name: String,
    pub similarity: f32,
}

impl SimilarityScore {
    /// `similarity * 100`, rounded to 2 decimals.
    pub fn as_percentage(&self) -> f64 {
        (self.similarity as f64 * 100.0 * 100.0).round() / 100.0
    }
}

/// Standard cosine similarity `dot(a, b) / (|a| * |b|)`.
/// Returns 0.0 when either vector has zero norm (nothing to compare against).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Ranks candidates by cosine similarity to the reference embedding,
/// descending. The sort is stable: ties keep the candidates' insertion
/// order, which is the only documented tie-break.
pub fn rank_by_similarity(
    reference: &[f32],
    candidates: &[(String, Vec<f32>)],
) -> Vec<SimilarityScore> {
    let mut scores: Vec<SimilarityScore> = candidates
        .iter()
        .map(|(name, embedding)| SimilarityScore {
            name: name.clone(),
            similarity: cosine_similarity(reference, embedding),
        })
        .collect();

    scores.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(pairs: Vec<(&str, Vec<f32>)>) -> Vec<(String, Vec<f32>)> {
        pairs
            .into_iter()
            .map(|(n, v)| (n.to_string(), v))
            .collect()
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = vec![0.3, -1.2, 0.7, 2.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_opposite_vectors_score_negative_one() {
        let sim = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]);
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_norm_yields_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_ranking_is_descending() {
        let reference = vec![1.0, 0.0];
        let ranked = rank_by_similarity(
            &reference,
            &named(vec![
                ("far.pdf", vec![0.0, 1.0]),
                ("close.pdf", vec![1.0, 0.1]),
                ("mid.pdf", vec![1.0, 1.0]),
            ]),
        );
        let names: Vec<&str> = ranked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["close.pdf", "mid.pdf", "far.pdf"]);
        assert!(ranked[0].similarity >= ranked[1].similarity);
        assert!(ranked[1].similarity >= ranked[2].similarity);
    }

    #[test]
    fn test_ties_preserve_insertion_order() {
        let reference = vec![1.0, 0.0];
        let duplicate = vec![0.5, 0.5];
        let ranked = rank_by_similarity(
            &reference,
            &named(vec![
                ("first.pdf", duplicate.clone()),
                ("second.pdf", duplicate.clone()),
                ("third.pdf", duplicate),
            ]),
        );
        let names: Vec<&str> = ranked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["first.pdf", "second.pdf", "third.pdf"]);
    }

    #[test]
    fn test_empty_candidates_yield_empty_ranking() {
        assert!(rank_by_similarity(&[1.0], &[]).is_empty());
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        let score = SimilarityScore {
            name: "a.pdf".to_string(),
            similarity: 0.87654,
        };
        assert_eq!(score.as_percentage(), 87.65);
    }

    #[test]
    fn test_percentage_can_be_negative() {
        let score = SimilarityScore {
            name: "a.pdf".to_string(),
            similarity: -0.25,
        };
        assert_eq!(score.as_percentage(), -25.0);
    }
}
