// ============================================
// Interaction Recorder
// ============================================
//
// Folds a single shopper interaction into the profile:
//
// weight = base_weight(type) * time_weight(age) * context_weight
//
// Time weights (age of the interaction when it is recorded):
// - < 24 hours: 1.0
// - < 7 days:   0.8
// - < 30 days:  0.6
// - older:      0.3
//
// Affinities only ever grow here. Age lowers the weight of the new
// observation; stored values are never scaled down on this path.

use crate::config::ScoringConfig;
use crate::models::{
    ContextSnapshot, Interaction, InteractionType, PriceRange, PurchaseRecord, UserProfile,
    WeightedInteraction,
};
use crate::utils::{exponential_decay, nearest_rank_percentile, safe_ratio};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

const PREFERRED_RANGE_LOW_PERCENTILE: f64 = 10.0;
const PREFERRED_RANGE_HIGH_PERCENTILE: f64 = 90.0;

pub struct InteractionRecorder {
    config: ScoringConfig,
}

impl InteractionRecorder {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn time_weight(age: Duration) -> f64 {
        if age < Duration::hours(24) {
            1.0
        } else if age < Duration::days(7) {
            0.8
        } else if age < Duration::days(30) {
            0.6
        } else {
            0.3
        }
    }

    /// Boost when the interaction declares a season or time of day that
    /// matches the current snapshot.
    pub fn context_weight(&self, interaction: &Interaction, context: &ContextSnapshot) -> f64 {
        let season_match = interaction.season == Some(context.season);
        let time_match = interaction.time_of_day == Some(context.time_of_day);

        if season_match || time_match {
            self.config.context_boost.max(0.0)
        } else {
            1.0
        }
    }

    pub fn interaction_weight(
        &self,
        interaction: &Interaction,
        now: DateTime<Utc>,
        context: &ContextSnapshot,
    ) -> f64 {
        interaction.kind.base_weight()
            * Self::time_weight(now - interaction.timestamp)
            * self.context_weight(interaction, context)
    }

    /// Apply one interaction to the profile and return the updated profile.
    pub fn record_interaction(
        &self,
        mut profile: UserProfile,
        interaction: Interaction,
        now: DateTime<Utc>,
        context: &ContextSnapshot,
    ) -> UserProfile {
        let weight = self.interaction_weight(&interaction, now, context);
        // Non-finite or negative prices are treated as absent.
        let price = interaction.price.filter(|p| p.is_finite() && *p >= 0.0);
        let interaction = Interaction {
            price,
            ..interaction
        };

        if let Some(category) = interaction.category.as_deref() {
            let delta = weight * self.config.category_weight(category);
            *profile
                .category_affinities
                .entry(category.to_string())
                .or_insert(0.0) += delta;
        }

        if let Some(brand) = interaction.brand.as_deref() {
            *profile.brand_affinities.entry(brand.to_string()).or_insert(0.0) += weight;
        }

        if let Some(price) = price {
            profile.price_range = Some(match profile.price_range {
                Some(range) => range.widened_to(price),
                None => PriceRange::point(price),
            });
        }

        let style_tokens = interaction
            .style
            .iter()
            .chain(interaction.tags.iter())
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        for token in style_tokens {
            *profile.style_profile.entry(token).or_insert(0) += 1;
        }

        profile.total_interactions += 1;
        match interaction.kind {
            InteractionType::View => profile.view_count += 1,
            InteractionType::Purchase => {
                profile.purchase_history.push(PurchaseRecord {
                    product_id: interaction.product_id.clone(),
                    price: price.unwrap_or(0.0),
                    category: interaction.category.clone(),
                    timestamp: interaction.timestamp,
                });
                self.refresh_purchase_metrics(&mut profile);
            }
            _ => {}
        }

        debug!(
            user_id = %profile.user_id,
            interaction_type = interaction.kind.as_str(),
            product_id = %interaction.product_id,
            weight = weight,
            "Recorded interaction"
        );

        profile
            .behavior_history
            .push_back(WeightedInteraction { interaction, weight });
        while profile.behavior_history.len() > self.config.max_history {
            profile.behavior_history.pop_front();
        }

        profile.updated_at = now;
        profile
    }

    /// Recompute conversion rate, order value and the preferred price range.
    ///
    /// Every purchase counts toward the conversion rate and order value.
    /// The preferred range needs enough purchases with a known price.
    fn refresh_purchase_metrics(&self, profile: &mut UserProfile) {
        let purchase_count = profile.purchase_history.len() as f64;
        let total_value: f64 = profile.purchase_history.iter().map(|p| p.price).sum();

        profile.conversion_rate = safe_ratio(purchase_count, profile.view_count as f64);
        profile.average_order_value = safe_ratio(total_value, purchase_count);
        profile.lifetime_value = total_value;

        let mut prices: Vec<f64> = profile
            .purchase_history
            .iter()
            .map(|p| p.price)
            .filter(|p| *p > 0.0)
            .collect();
        if prices.len() >= self.config.min_purchases_for_price_range {
            prices.sort_by(|a, b| a.total_cmp(b));

            let low = nearest_rank_percentile(&prices, PREFERRED_RANGE_LOW_PERCENTILE);
            let high = nearest_rank_percentile(&prices, PREFERRED_RANGE_HIGH_PERCENTILE);
            if let (Some(low), Some(high)) = (low, high) {
                profile.preferred_price_range = Some(PriceRange::new(low, high));
            }
        }
    }
}

/// Scale stored affinities by their age since the last profile update.
///
/// Never runs implicitly; the batch job calls it only when a half-life is
/// configured. Values never increase.
pub fn decay_stored_affinities(
    mut profile: UserProfile,
    now: DateTime<Utc>,
    half_life_hours: f64,
) -> UserProfile {
    let age_hours = (now - profile.updated_at).num_seconds() as f64 / 3600.0;
    let factor = exponential_decay(age_hours, half_life_hours).clamp(0.0, 1.0);

    for value in profile.category_affinities.values_mut() {
        *value *= factor;
    }
    for value in profile.brand_affinities.values_mut() {
        *value *= factor;
    }

    profile.updated_at = now;
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Season, TimeOfDay};

    fn winter_evening() -> ContextSnapshot {
        ContextSnapshot {
            season: Season::Winter,
            time_of_day: TimeOfDay::Evening,
        }
    }

    fn recorder() -> InteractionRecorder {
        InteractionRecorder::new(ScoringConfig::default())
    }

    #[test]
    fn test_time_weight_buckets() {
        assert_eq!(InteractionRecorder::time_weight(Duration::hours(1)), 1.0);
        assert_eq!(InteractionRecorder::time_weight(Duration::hours(-3)), 1.0);
        assert_eq!(InteractionRecorder::time_weight(Duration::days(3)), 0.8);
        assert_eq!(InteractionRecorder::time_weight(Duration::days(10)), 0.6);
        assert_eq!(InteractionRecorder::time_weight(Duration::days(45)), 0.3);
    }

    #[test]
    fn test_interaction_weight_combines_factors() {
        let now = Utc::now();
        let recorder = recorder();
        let ctx = winter_evening();

        let fresh_purchase = Interaction::new(InteractionType::Purchase, "p1", now);
        assert!((recorder.interaction_weight(&fresh_purchase, now, &ctx) - 10.0).abs() < 1e-9);

        let old_cart = Interaction::new(InteractionType::AddToCart, "p2", now - Duration::days(3))
            .with_context(Some(Season::Winter), None);
        // 5.0 * 0.8 * 1.2
        assert!((recorder.interaction_weight(&old_cart, now, &ctx) - 4.8).abs() < 1e-9);

        let mismatched = Interaction::new(InteractionType::View, "p3", now)
            .with_context(Some(Season::Summer), Some(TimeOfDay::Morning));
        assert!((recorder.interaction_weight(&mismatched, now, &ctx) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_updates_affinities_and_style() {
        let now = Utc::now();
        let profile = UserProfile::new("u1", now);
        let interaction = Interaction::new(InteractionType::Click, "p1", now)
            .with_category("jackets")
            .with_brand("northpeak")
            .with_price(2500.0)
            .with_style("Minimal")
            .with_tags(["wool", " ", "minimal"]);

        let profile = recorder().record_interaction(profile, interaction, now, &winter_evening());

        assert_eq!(profile.category_affinity("jackets"), 2.0);
        assert_eq!(profile.brand_affinity("northpeak"), 2.0);
        assert_eq!(profile.style_count("minimal"), 2);
        assert_eq!(profile.style_count("wool"), 1);
        assert_eq!(profile.price_range, Some(PriceRange::point(2500.0)));
        assert_eq!(profile.behavior_history.len(), 1);
        assert_eq!(profile.total_interactions, 1);
    }

    #[test]
    fn test_category_static_weight_applies() {
        let now = Utc::now();
        let recorder =
            InteractionRecorder::new(ScoringConfig::default().with_category_weight("shoes", 1.5));
        let interaction = Interaction::new(InteractionType::View, "p1", now).with_category("shoes");

        let profile = recorder.record_interaction(
            UserProfile::new("u1", now),
            interaction,
            now,
            &winter_evening(),
        );
        assert!((profile.category_affinity("shoes") - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_history_is_capped_fifo() {
        let now = Utc::now();
        let config = ScoringConfig {
            max_history: 3,
            ..Default::default()
        };
        let recorder = InteractionRecorder::new(config);
        let ctx = winter_evening();

        let mut profile = UserProfile::new("u1", now);
        for i in 0..5 {
            let interaction = Interaction::new(InteractionType::View, format!("p{}", i), now);
            profile = recorder.record_interaction(profile, interaction, now, &ctx);
        }

        let ids: Vec<_> = profile
            .behavior_history
            .iter()
            .map(|w| w.interaction.product_id.as_str())
            .collect();
        assert_eq!(ids, vec!["p2", "p3", "p4"]);
        assert_eq!(profile.view_count, 5);
    }

    #[test]
    fn test_purchase_metrics_and_preferred_range() {
        let now = Utc::now();
        let recorder = recorder();
        let ctx = winter_evening();
        let mut profile = UserProfile::new("u1", now);

        for i in 0..4 {
            let view = Interaction::new(InteractionType::View, format!("p{}", i), now);
            profile = recorder.record_interaction(profile, view, now, &ctx);
        }

        for (i, price) in [1000.0, 2000.0, 3000.0, 4000.0].iter().enumerate() {
            let purchase = Interaction::new(InteractionType::Purchase, format!("p{}", i), now)
                .with_price(*price);
            profile = recorder.record_interaction(profile, purchase, now, &ctx);
        }
        assert!(profile.preferred_price_range.is_none());
        assert!((profile.conversion_rate - 1.0).abs() < 1e-9);

        let purchase = Interaction::new(InteractionType::Purchase, "p9", now).with_price(5000.0);
        profile = recorder.record_interaction(profile, purchase, now, &ctx);

        assert!((profile.average_order_value - 3000.0).abs() < 1e-9);
        assert!((profile.lifetime_value - 15000.0).abs() < 1e-9);
        assert!((profile.conversion_rate - 5.0 / 4.0).abs() < 1e-9);
        assert_eq!(
            profile.preferred_price_range,
            Some(PriceRange::new(1000.0, 5000.0))
        );
    }

    #[test]
    fn test_malformed_purchase_prices_are_treated_as_absent() {
        let now = Utc::now();
        let recorder = recorder();
        let ctx = winter_evening();
        let mut profile = UserProfile::new("u1", now);

        profile = recorder.record_interaction(
            profile,
            Interaction::new(InteractionType::View, "p0", now),
            now,
            &ctx,
        );
        for (i, price) in [f64::NAN, -500.0, f64::INFINITY, 300.0].iter().enumerate() {
            let purchase = Interaction::new(InteractionType::Purchase, format!("p{}", i), now)
                .with_price(*price);
            profile = recorder.record_interaction(profile, purchase, now, &ctx);
        }

        assert_eq!(profile.purchase_count(), 4);
        assert!(profile.purchase_history.iter().all(|p| p.price >= 0.0));
        assert!(profile
            .behavior_history
            .iter()
            .all(|w| w.interaction.price.map_or(true, |p| p >= 0.0)));
        assert!((profile.lifetime_value - 300.0).abs() < 1e-9);
        assert!((profile.average_order_value - 75.0).abs() < 1e-9);
        assert_eq!(profile.price_range, Some(PriceRange::point(300.0)));

        let json = serde_json::to_string(&profile).unwrap();
        let restored: UserProfile = serde_json::from_str(&json).unwrap();
        assert!((restored.lifetime_value - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_preferred_range_needs_priced_purchases() {
        let now = Utc::now();
        let recorder = recorder();
        let ctx = winter_evening();
        let mut profile = UserProfile::new("u1", now);

        for i in 0..4 {
            let purchase = Interaction::new(InteractionType::Purchase, format!("p{}", i), now)
                .with_price(1000.0 * (i + 1) as f64);
            profile = recorder.record_interaction(profile, purchase, now, &ctx);
        }
        let unpriced = Interaction::new(InteractionType::Purchase, "p8", now).with_price(-1.0);
        profile = recorder.record_interaction(profile, unpriced, now, &ctx);
        assert_eq!(profile.purchase_count(), 5);
        assert!(profile.preferred_price_range.is_none());

        let priced = Interaction::new(InteractionType::Purchase, "p9", now).with_price(5000.0);
        profile = recorder.record_interaction(profile, priced, now, &ctx);
        assert_eq!(
            profile.preferred_price_range,
            Some(PriceRange::new(1000.0, 5000.0))
        );
    }

    #[test]
    fn test_empty_profile_metrics_are_zero() {
        let profile = UserProfile::new("u1", Utc::now());
        assert_eq!(profile.conversion_rate, 0.0);
        assert_eq!(profile.average_order_value, 0.0);
    }

    #[test]
    fn test_purchase_without_views_has_zero_conversion() {
        let now = Utc::now();
        let purchase = Interaction::new(InteractionType::Purchase, "p1", now).with_price(100.0);
        let profile = recorder().record_interaction(
            UserProfile::new("u1", now),
            purchase,
            now,
            &winter_evening(),
        );
        assert_eq!(profile.conversion_rate, 0.0);
        assert!((profile.average_order_value - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_affinities_never_decrease_while_recording() {
        let now = Utc::now();
        let recorder = recorder();
        let ctx = winter_evening();
        let mut profile = UserProfile::new("u1", now);

        let sequence = [
            ("jackets", InteractionType::Purchase, 0),
            ("shoes", InteractionType::View, 40),
            ("jackets", InteractionType::View, 60),
            ("bags", InteractionType::Share, 2),
        ];

        for (category, kind, days_ago) in sequence {
            let before = profile.clone();
            let interaction = Interaction::new(kind, "p", now - Duration::days(days_ago))
                .with_category(category);
            profile = recorder.record_interaction(profile, interaction, now, &ctx);

            for (cat, value) in &profile.category_affinities {
                assert!(*value >= 0.0);
                let previous = before.category_affinity(cat);
                if cat == category {
                    assert!(*value > previous);
                } else {
                    assert_eq!(*value, previous);
                }
            }
        }

        // Long sessions keep accumulating; nothing caps the sum.
        assert!(profile.category_affinity("jackets") > 10.0);
    }

    #[test]
    fn test_decay_stored_affinities_only_shrinks() {
        let now = Utc::now();
        let mut profile = UserProfile::new("u1", now - Duration::hours(24));
        profile.category_affinities.insert("jackets".to_string(), 8.0);
        profile.brand_affinities.insert("northpeak".to_string(), 4.0);

        let decayed = decay_stored_affinities(profile, now, 24.0);

        assert!((decayed.category_affinity("jackets") - 4.0).abs() < 0.01);
        assert!((decayed.brand_affinity("northpeak") - 2.0).abs() < 0.01);
        assert_eq!(decayed.updated_at, now);
    }
}
