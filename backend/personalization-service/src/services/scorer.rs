use super::context::ContextualBooster;
use super::diversity::CategoryDiversityFilter;
use super::profile_builder::InteractionRecorder;
use super::ranking::{combine_rankings, score_content_based, score_from_neighbors, CollaborativeOutcome};
use super::similarity::{self, find_similar_users};
use crate::config::ScoringConfig;
use crate::models::{
    ContextSnapshot, Interaction, Product, Recommendation, ScoredProduct, SimilarUser, UserProfile,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Recommendation Scorer - 推薦打分管線
///
/// Pure, synchronous pipeline:
/// profile update -> affinity scoring -> similarity ranking -> diversity filter
///
/// All state arrives as arguments; nothing is cached between calls.
pub struct RecommendationScorer {
    config: ScoringConfig,
    recorder: InteractionRecorder,
    diversity: CategoryDiversityFilter,
    booster: ContextualBooster,
}

impl Default for RecommendationScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl RecommendationScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            recorder: InteractionRecorder::new(config.clone()),
            diversity: CategoryDiversityFilter::new(config.diversity_factor),
            booster: ContextualBooster::default(),
            config,
        }
    }

    pub fn with_booster(mut self, booster: ContextualBooster) -> Self {
        self.booster = booster;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn record_interaction(
        &self,
        profile: UserProfile,
        interaction: Interaction,
        now: DateTime<Utc>,
        context: &ContextSnapshot,
    ) -> UserProfile {
        self.recorder.record_interaction(profile, interaction, now, context)
    }

    pub fn similarity(&self, a: &UserProfile, b: &UserProfile) -> f64 {
        similarity::similarity(a, b)
    }

    pub fn find_similar_users(
        &self,
        target: &UserProfile,
        profiles: &[UserProfile],
        limit: usize,
    ) -> Vec<SimilarUser> {
        find_similar_users(target, profiles, self.config.min_similarity, limit)
    }

    pub fn score_content_based(&self, profile: &UserProfile, products: &[Product]) -> Vec<ScoredProduct> {
        score_content_based(profile, products)
    }

    /// Collaborative scoring with neighbours found on the fly.
    pub fn score_collaborative(
        &self,
        profile: &UserProfile,
        products: &[Product],
        profiles: &[UserProfile],
    ) -> CollaborativeOutcome {
        let neighbors = self.find_similar_users(profile, profiles, self.config.neighbor_limit);
        score_from_neighbors(profile, products, &neighbors, profiles)
    }

    /// Collaborative scoring with precomputed neighbours.
    pub fn score_collaborative_with_neighbors(
        &self,
        profile: &UserProfile,
        products: &[Product],
        neighbors: &[SimilarUser],
        profiles: &[UserProfile],
    ) -> CollaborativeOutcome {
        let limit = self.config.neighbor_limit.min(neighbors.len());
        score_from_neighbors(profile, products, &neighbors[..limit], profiles)
    }

    pub fn hybrid_recommend(
        &self,
        profile: &UserProfile,
        products: &[Product],
        profiles: &[UserProfile],
        limit: usize,
    ) -> Vec<Recommendation> {
        let collaborative = self.score_collaborative(profile, products, profiles);
        self.blend(profile, products, collaborative, limit, self.config.hybrid_weight)
    }

    pub fn hybrid_recommend_weighted(
        &self,
        profile: &UserProfile,
        products: &[Product],
        profiles: &[UserProfile],
        limit: usize,
        hybrid_weight: f64,
    ) -> Vec<Recommendation> {
        let collaborative = self.score_collaborative(profile, products, profiles);
        self.blend(profile, products, collaborative, limit, hybrid_weight)
    }

    /// Blend a collaborative outcome with content-based ranking, then apply
    /// the category diversity filter.
    pub fn blend(
        &self,
        profile: &UserProfile,
        products: &[Product],
        collaborative: CollaborativeOutcome,
        limit: usize,
        hybrid_weight: f64,
    ) -> Vec<Recommendation> {
        if limit == 0 || products.is_empty() {
            return Vec::new();
        }

        let oversample = limit.saturating_mul(2);
        let mut collab = collaborative.scored;
        collab.truncate(oversample);
        let mut content = score_content_based(profile, products);
        content.truncate(oversample);

        let combined = combine_rankings(&collab, &content, hybrid_weight);
        let selected = self.diversity.select(combined, limit);

        debug!(
            user_id = %profile.user_id,
            collaborative = collab.len(),
            content = content.len(),
            fallback = collaborative.fallback,
            selected = selected.len(),
            "Hybrid recommendation blended"
        );

        selected
    }

    pub fn apply_contextual_boost(
        &self,
        recommendations: Vec<Recommendation>,
        context: &ContextSnapshot,
    ) -> Vec<Recommendation> {
        self.booster.apply(recommendations, context)
    }
}
