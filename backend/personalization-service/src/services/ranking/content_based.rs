use crate::models::{Product, ScoredProduct, UserProfile};
use crate::utils::{by_score_desc, safe_ratio};

const CATEGORY_WEIGHT: f64 = 0.4;
const BRAND_WEIGHT: f64 = 0.3;
const PRICE_WEIGHT: f64 = 0.2;
const STYLE_WEIGHT: f64 = 0.1;

/// Score a single product against the shopper's accumulated preferences.
///
/// score = 0.4 * category_affinity
///       + 0.3 * brand_affinity
///       + 0.2 * [price within preferred range]
///       + 0.1 * mean style affinity over product tags
pub fn content_score(profile: &UserProfile, product: &Product) -> f64 {
    let category = profile.category_affinity(&product.category);

    let brand = product
        .brand
        .as_deref()
        .map(|b| profile.brand_affinity(b))
        .unwrap_or(0.0);

    let price_match = match (product.price, profile.preferred_price_range) {
        (Some(price), Some(range)) if range.contains(price) => 1.0,
        _ => 0.0,
    };

    let style_total: f64 = product
        .tags
        .iter()
        .map(|tag| profile.style_count(&tag.trim().to_lowercase()) as f64)
        .sum();
    let style = safe_ratio(style_total, product.tags.len() as f64);

    CATEGORY_WEIGHT * category + BRAND_WEIGHT * brand + PRICE_WEIGHT * price_match + STYLE_WEIGHT * style
}

/// Rank candidates by content score, dropping products that score zero.
pub fn score_content_based(profile: &UserProfile, products: &[Product]) -> Vec<ScoredProduct> {
    let mut scored: Vec<ScoredProduct> = products
        .iter()
        .map(|product| ScoredProduct {
            product: product.clone(),
            score: content_score(profile, product),
        })
        .filter(|s| s.score > 0.0)
        .collect();

    scored.sort_by(|a, b| by_score_desc(a.score, b.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceRange;
    use chrono::Utc;

    fn product(id: &str, category: &str, price: Option<f64>) -> Product {
        Product {
            id: id.to_string(),
            name: String::new(),
            description: String::new(),
            category: category.to_string(),
            brand: None,
            price,
            tags: Vec::new(),
            season: None,
            occasion: None,
        }
    }

    #[test]
    fn test_jackets_outrank_shoes() {
        let mut profile = UserProfile::new("u1", Utc::now());
        profile.category_affinities.insert("jackets".to_string(), 10.0);
        profile.category_affinities.insert("shoes".to_string(), 2.0);
        profile.preferred_price_range = Some(PriceRange::new(1000.0, 4000.0));

        let products = vec![
            product("2", "shoes", Some(1500.0)),
            product("1", "jackets", Some(3000.0)),
        ];

        let ranked = score_content_based(&profile, &products);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].product.id, "1");
        assert!((ranked[0].score - 4.2).abs() < 1e-9);
        assert_eq!(ranked[1].product.id, "2");
        assert!((ranked[1].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_scores_are_dropped() {
        let mut profile = UserProfile::new("u1", Utc::now());
        profile.category_affinities.insert("jackets".to_string(), 1.0);

        let products = vec![product("1", "bags", None), product("2", "jackets", None)];
        let ranked = score_content_based(&profile, &products);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].product.id, "2");
    }

    #[test]
    fn test_brand_and_style_contribute() {
        let mut profile = UserProfile::new("u1", Utc::now());
        profile.brand_affinities.insert("northpeak".to_string(), 2.0);
        profile.style_profile.insert("wool".to_string(), 4);

        let mut p = product("1", "jackets", None);
        p.brand = Some("northpeak".to_string());
        p.tags = vec!["Wool".to_string(), "hooded".to_string()];

        // 0.3 * 2 + 0.1 * (4 + 0) / 2
        assert!((content_score(&profile, &p) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs() {
        let profile = UserProfile::new("u1", Utc::now());
        assert!(score_content_based(&profile, &[]).is_empty());
        assert!(score_content_based(&profile, &[product("1", "jackets", Some(10.0))]).is_empty());
    }
}
