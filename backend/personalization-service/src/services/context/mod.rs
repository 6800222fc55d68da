use crate::models::{ContextSnapshot, Product, Recommendation, Season};
use crate::utils::{by_score_desc, contains_phrase, word_tokens};

/// Category keywords that get the strongest boost in a given season.
const SEASONAL_CATEGORIES: &[(Season, &[&str])] = &[
    (
        Season::Winter,
        &["outerwear", "jacket", "coat", "boot", "sweater", "knitwear"],
    ),
    (
        Season::Summer,
        &["swimwear", "shorts", "sandal", "sunglasses", "dress"],
    ),
    (Season::Spring, &["raincoat", "umbrella", "trench"]),
    (Season::Autumn, &["jacket", "boot", "cardigan", "scarf"]),
];

/// Multiplicative contextual boosts. Each matching boost multiplies the
/// score independently, so the application order does not matter.
#[derive(Debug, Clone, Copy)]
pub struct ContextualBooster {
    pub time_of_day_boost: f64,
    pub season_boost: f64,
    pub seasonal_category_boost: f64,
}

impl Default for ContextualBooster {
    fn default() -> Self {
        Self {
            time_of_day_boost: 1.2,
            season_boost: 1.3,
            seasonal_category_boost: 1.4,
        }
    }
}

impl ContextualBooster {
    pub fn multiplier(&self, product: &Product, context: &ContextSnapshot) -> f64 {
        let mut multiplier = 1.0;

        if Self::matches_time_of_day(product, context) {
            multiplier *= self.time_of_day_boost;
        }
        if product.season == Some(context.season) {
            multiplier *= self.season_boost;
        }
        if Self::is_seasonal_category(&product.category, context.season) {
            multiplier *= self.seasonal_category_boost;
        }

        multiplier
    }

    pub fn apply(&self, recommendations: Vec<Recommendation>, context: &ContextSnapshot) -> Vec<Recommendation> {
        let mut boosted: Vec<Recommendation> = recommendations
            .into_iter()
            .map(|mut rec| {
                rec.score *= self.multiplier(&rec.product, context);
                rec
            })
            .collect();

        boosted.sort_by(|a, b| by_score_desc(a.score, b.score));
        boosted
    }

    fn matches_time_of_day(product: &Product, context: &ContextSnapshot) -> bool {
        let label = context.time_of_day.as_str();
        let tag_match = product.tags.iter().any(|t| t.eq_ignore_ascii_case(label));
        let occasion_match = product
            .occasion
            .map(|o| context.time_of_day.matching_occasions().contains(&o))
            .unwrap_or(false);
        tag_match || occasion_match
    }

    /// Whole-word match, so "raincoats" is not a winter "coat".
    fn is_seasonal_category(category: &str, season: Season) -> bool {
        let words = word_tokens(category);
        SEASONAL_CATEGORIES
            .iter()
            .filter(|(s, _)| *s == season)
            .any(|(_, keywords)| keywords.iter().any(|k| contains_phrase(&words, k)))
    }
}
