use super::content_based::score_content_based;
use crate::models::{Product, ScoredProduct, SimilarUser, UserProfile};
use crate::utils::by_score_desc;
use std::collections::HashMap;
use tracing::info;

/// Result of collaborative scoring.
///
/// `fallback` is set when no similar shoppers were found and the scores
/// come from content-based ranking instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CollaborativeOutcome {
    pub scored: Vec<ScoredProduct>,
    pub neighbors: usize,
    pub fallback: bool,
}

/// Score candidates from the conversions of already-ranked neighbours.
///
/// Each neighbour's `purchase` / `add_to_cart` history entries for candidate
/// products add `similarity * recorded weight` to that product.
pub fn score_from_neighbors(
    profile: &UserProfile,
    products: &[Product],
    neighbors: &[SimilarUser],
    profiles: &[UserProfile],
) -> CollaborativeOutcome {
    if neighbors.is_empty() {
        info!(
            user_id = %profile.user_id,
            "Collaborative scoring: no similar users, falling back to content-based"
        );
        return CollaborativeOutcome {
            scored: score_content_based(profile, products),
            neighbors: 0,
            fallback: true,
        };
    }

    let by_id: HashMap<&str, &UserProfile> =
        profiles.iter().map(|p| (p.user_id.as_str(), p)).collect();
    let candidate_ids: HashMap<&str, usize> = products
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.as_str(), i))
        .collect();

    let mut product_scores: HashMap<usize, f64> = HashMap::new();
    for neighbor in neighbors {
        let Some(other) = by_id.get(neighbor.user_id.as_str()) else {
            continue;
        };

        for entry in &other.behavior_history {
            if !entry.interaction.kind.is_conversion_signal() {
                continue;
            }
            if let Some(&idx) = candidate_ids.get(entry.interaction.product_id.as_str()) {
                *product_scores.entry(idx).or_insert(0.0) += neighbor.similarity * entry.weight;
            }
        }
    }

    // Emit in catalog order so the stable sort breaks ties deterministically.
    let mut indices: Vec<usize> = product_scores.keys().copied().collect();
    indices.sort_unstable();
    let mut scored: Vec<ScoredProduct> = indices
        .into_iter()
        .map(|idx| ScoredProduct {
            product: products[idx].clone(),
            score: product_scores[&idx],
        })
        .filter(|s| s.score > 0.0)
        .collect();
    scored.sort_by(|a, b| by_score_desc(a.score, b.score));

    info!(
        user_id = %profile.user_id,
        neighbors = neighbors.len(),
        scored = scored.len(),
        "Collaborative scoring completed"
    );

    CollaborativeOutcome {
        scored,
        neighbors: neighbors.len(),
        fallback: false,
    }
}
