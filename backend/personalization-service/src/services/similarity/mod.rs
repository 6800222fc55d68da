use crate::models::{SimilarUser, UserProfile};
use crate::utils::{by_score_desc, cosine_similarity, interval_overlap_ratio, jaccard_index, safe_ratio};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

const CATEGORY_WEIGHT: f64 = 0.4;
const BRAND_WEIGHT: f64 = 0.3;
const PRICE_WEIGHT: f64 = 0.2;
const STYLE_WEIGHT: f64 = 0.1;

/// Per-signal similarity between two shoppers, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimilarityBreakdown {
    pub category: f64,
    pub brand: f64,
    pub price: f64,
    pub style: f64,
}

impl SimilarityBreakdown {
    pub fn combined(&self) -> f64 {
        (CATEGORY_WEIGHT * self.category
            + BRAND_WEIGHT * self.brand
            + PRICE_WEIGHT * self.price
            + STYLE_WEIGHT * self.style)
            .clamp(0.0, 1.0)
    }
}

pub fn similarity_breakdown(a: &UserProfile, b: &UserProfile) -> SimilarityBreakdown {
    SimilarityBreakdown {
        category: cosine_similarity(&a.category_affinities, &b.category_affinities),
        brand: brand_similarity(a, b),
        price: price_similarity(a, b),
        style: style_similarity(a, b),
    }
}

/// Symmetric similarity of two shoppers in [0, 1].
pub fn similarity(a: &UserProfile, b: &UserProfile) -> f64 {
    similarity_breakdown(a, b).combined()
}

fn brand_similarity(a: &UserProfile, b: &UserProfile) -> f64 {
    let brands = |p: &UserProfile| -> HashSet<String> {
        p.brand_affinities
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(k, _)| k.clone())
            .collect()
    };
    jaccard_index(&brands(a), &brands(b))
}

fn price_similarity(a: &UserProfile, b: &UserProfile) -> f64 {
    match (&a.preferred_price_range, &b.preferred_price_range) {
        (Some(ra), Some(rb)) => interval_overlap_ratio(ra, rb),
        _ => 0.0,
    }
}

fn style_similarity(a: &UserProfile, b: &UserProfile) -> f64 {
    let tokens: HashSet<&String> = a.style_profile.keys().chain(b.style_profile.keys()).collect();
    if tokens.is_empty() {
        return 0.0;
    }

    let total: f64 = tokens
        .iter()
        .map(|token| {
            let ca = a.style_count(token);
            let cb = b.style_count(token);
            safe_ratio(ca.min(cb) as f64, ca.max(cb).max(1) as f64)
        })
        .sum();

    safe_ratio(total, tokens.len() as f64)
}

/// Rank other shoppers by similarity to `target`.
///
/// Ties keep the iteration order of `profiles`: the sort is stable and has no
/// secondary key.
pub fn find_similar_users(
    target: &UserProfile,
    profiles: &[UserProfile],
    min_similarity: f64,
    limit: usize,
) -> Vec<SimilarUser> {
    let mut similar: Vec<SimilarUser> = profiles
        .iter()
        .filter(|other| other.user_id != target.user_id)
        .map(|other| SimilarUser {
            user_id: other.user_id.clone(),
            similarity: similarity(target, other),
        })
        .filter(|s| s.similarity >= min_similarity)
        .collect();

    similar.sort_by(|a, b| by_score_desc(a.similarity, b.similarity));
    similar.truncate(limit);
    similar
}

/// Precomputed neighbours for every shopper, produced by the batch job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarityIndex {
    neighbors: HashMap<String, Vec<SimilarUser>>,
}

impl SimilarityIndex {
    pub fn build(profiles: &[UserProfile], min_similarity: f64, limit: usize) -> Self {
        let neighbors: HashMap<String, Vec<SimilarUser>> = profiles
            .iter()
            .map(|profile| {
                (
                    profile.user_id.clone(),
                    find_similar_users(profile, profiles, min_similarity, limit),
                )
            })
            .collect();

        info!(
            users = neighbors.len(),
            pairs = neighbors.values().map(Vec::len).sum::<usize>(),
            "Built similarity index"
        );

        Self { neighbors }
    }

    pub fn neighbors(&self, user_id: &str) -> Option<&[SimilarUser]> {
        self.neighbors.get(user_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceRange;
    use chrono::Utc;
    use proptest::prelude::*;

    fn profile(id: &str, categories: &[(&str, f64)], brands: &[(&str, f64)]) -> UserProfile {
        let mut p = UserProfile::new(id, Utc::now());
        p.category_affinities = categories.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        p.brand_affinities = brands.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        p
    }

    #[test]
    fn test_identical_categories_have_full_category_similarity() {
        let a = profile("a", &[("jackets", 10.0), ("shoes", 2.0)], &[]);
        let b = profile("b", &[("jackets", 10.0), ("shoes", 2.0)], &[]);

        let breakdown = similarity_breakdown(&a, &b);
        assert!((breakdown.category - 1.0).abs() < 1e-9);
        assert!((similarity(&a, &b) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_brand_similarity_ignores_zero_affinity() {
        let a = profile("a", &[], &[("nike", 3.0), ("puma", 0.0)]);
        let b = profile("b", &[], &[("nike", 1.0), ("puma", 2.0)]);
        let breakdown = similarity_breakdown(&a, &b);
        assert!((breakdown.brand - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_price_similarity_requires_both_ranges() {
        let mut a = profile("a", &[], &[]);
        let mut b = profile("b", &[], &[]);
        a.preferred_price_range = Some(PriceRange::new(1000.0, 3000.0));
        assert_eq!(similarity_breakdown(&a, &b).price, 0.0);

        b.preferred_price_range = Some(PriceRange::new(2000.0, 4000.0));
        assert!((similarity_breakdown(&a, &b).price - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_style_similarity() {
        let mut a = profile("a", &[], &[]);
        let mut b = profile("b", &[], &[]);
        a.style_profile.insert("minimal".to_string(), 2);
        a.style_profile.insert("wool".to_string(), 1);
        b.style_profile.insert("minimal".to_string(), 4);

        // minimal: 2/4, wool: 0/1
        assert!((similarity_breakdown(&a, &b).style - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_empty_profiles_are_not_similar() {
        let a = profile("a", &[], &[]);
        let b = profile("b", &[], &[]);
        assert_eq!(similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_find_similar_users_filters_and_ranks() {
        let target = profile("t", &[("jackets", 5.0)], &[("nike", 1.0)]);
        let profiles = vec![
            target.clone(),
            profile("close", &[("jackets", 3.0)], &[("nike", 2.0)]),
            profile("far", &[("bags", 3.0)], &[]),
            profile("mid", &[("jackets", 1.0), ("bags", 1.0)], &[]),
        ];

        let similar = find_similar_users(&target, &profiles, 0.1, 10);
        let ids: Vec<_> = similar.iter().map(|s| s.user_id.as_str()).collect();
        assert_eq!(ids, vec!["close", "mid"]);

        let limited = find_similar_users(&target, &profiles, 0.1, 1);
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_find_similar_users_below_threshold_is_empty() {
        let target = profile("t", &[("jackets", 5.0)], &[]);
        let profiles = vec![
            profile("x", &[("bags", 3.0)], &[]),
            profile("y", &[("shoes", 3.0)], &[]),
        ];
        assert!(find_similar_users(&target, &profiles, 0.1, 10).is_empty());
    }

    #[test]
    fn test_find_similar_users_ties_keep_input_order() {
        let target = profile("t", &[("jackets", 1.0)], &[]);
        let profiles = vec![
            profile("second", &[("jackets", 2.0)], &[]),
            profile("first", &[("jackets", 7.0)], &[]),
        ];
        let ids: Vec<_> = find_similar_users(&target, &profiles, 0.1, 10)
            .into_iter()
            .map(|s| s.user_id)
            .collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[test]
    fn test_similarity_index() {
        let profiles = vec![
            profile("a", &[("jackets", 5.0)], &[]),
            profile("b", &[("jackets", 2.0)], &[]),
            profile("c", &[("bags", 2.0)], &[]),
        ];
        let index = SimilarityIndex::build(&profiles, 0.1, 5);
        assert_eq!(index.len(), 3);
        assert_eq!(index.neighbors("a").unwrap()[0].user_id, "b");
        assert!(index.neighbors("c").unwrap().is_empty());
        assert!(index.neighbors("missing").is_none());
    }

    fn arb_profile(id: &'static str) -> impl Strategy<Value = UserProfile> {
        (
            prop::collection::hash_map("[a-e]", 0.0f64..50.0, 0..5),
            prop::collection::hash_map("[v-z]", 0.0f64..50.0, 0..5),
            prop::collection::hash_map("[k-o]", 0u32..10, 0..5),
            prop::option::of((0.0f64..5000.0, 0.0f64..5000.0)),
        )
            .prop_map(move |(categories, brands, styles, range)| {
                let mut p = UserProfile::new(id, Utc::now());
                p.category_affinities = categories;
                p.brand_affinities = brands;
                p.style_profile = styles;
                p.preferred_price_range = range.map(|(lo, hi)| PriceRange::new(lo, hi));
                p
            })
    }

    proptest! {
        #[test]
        fn prop_similarity_is_symmetric(a in arb_profile("a"), b in arb_profile("b")) {
            let ab = similarity(&a, &b);
            let ba = similarity(&b, &a);
            prop_assert!((ab - ba).abs() < 1e-9);
        }

        #[test]
        fn prop_similarity_is_bounded(a in arb_profile("a"), b in arb_profile("b")) {
            let s = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
