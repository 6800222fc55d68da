use crate::models::{Product, Recommendation, RecommendationSource, ScoredProduct};
use crate::utils::by_score_desc;
use std::collections::HashMap;

/// Position-based score: first of N scores 1.0, last scores 1/N.
pub fn rank_score(index: usize, len: usize) -> f64 {
    if len == 0 || index >= len {
        return 0.0;
    }
    (len - index) as f64 / len as f64
}

/// Blend two rankings by normalized rank.
///
/// combined = w * collab_rank_score + (1 - w) * content_rank_score
///
/// A product missing from one list contributes 0 for that term. Output is
/// sorted by combined score; ties keep first-appearance order (collaborative
/// list first).
pub fn combine_rankings(
    collaborative: &[ScoredProduct],
    content: &[ScoredProduct],
    hybrid_weight: f64,
) -> Vec<Recommendation> {
    let w = hybrid_weight.clamp(0.0, 1.0);

    let mut order: Vec<&Product> = Vec::new();
    let mut scores: HashMap<&str, (f64, f64)> = HashMap::new();

    for (i, scored) in collaborative.iter().enumerate() {
        let entry = scores.entry(scored.product.id.as_str()).or_insert_with(|| {
            order.push(&scored.product);
            (0.0, 0.0)
        });
        entry.0 = entry.0.max(rank_score(i, collaborative.len()));
    }
    for (i, scored) in content.iter().enumerate() {
        let entry = scores.entry(scored.product.id.as_str()).or_insert_with(|| {
            order.push(&scored.product);
            (0.0, 0.0)
        });
        entry.1 = entry.1.max(rank_score(i, content.len()));
    }

    let mut combined: Vec<Recommendation> = order
        .into_iter()
        .map(|product| {
            let (collab, content) = scores[product.id.as_str()];
            let source = match (collab > 0.0, content > 0.0) {
                (true, true) => RecommendationSource::Hybrid,
                (true, false) => RecommendationSource::Collaborative,
                _ => RecommendationSource::ContentBased,
            };
            Recommendation {
                product: product.clone(),
                score: w * collab + (1.0 - w) * content,
                source,
            }
        })
        .collect();

    combined.sort_by(|a, b| by_score_desc(a.score, b.score));
    combined
}
