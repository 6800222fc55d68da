use super::scorer::RecommendationScorer;
use super::similarity::SimilarityIndex;
use crate::error::Result;
use crate::models::{ContextSnapshot, Interaction, RawInteraction, Recommendation, UserProfile};
use crate::store::{Clock, ProductCatalog, ProfileStore};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Personalization Service - 個性化服務
///
/// Owns the profile lifecycle around the pure scorer:
/// get-or-create -> update -> persist on every interaction, and
/// load inputs -> hybrid ranking -> contextual boost on every request.
///
/// Profile writes for one shopper are serialized through a per-user lock,
/// and every read-modify-write re-reads the stored profile under it.
pub struct PersonalizationService {
    store: Arc<dyn ProfileStore>,
    catalog: Arc<dyn ProductCatalog>,
    clock: Arc<dyn Clock>,
    scorer: RecommendationScorer,
    similarity_index: RwLock<Option<Arc<SimilarityIndex>>>,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PersonalizationService {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        catalog: Arc<dyn ProductCatalog>,
        clock: Arc<dyn Clock>,
        scorer: RecommendationScorer,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            scorer,
            similarity_index: RwLock::new(None),
            user_locks: DashMap::new(),
        }
    }

    pub fn scorer(&self) -> &RecommendationScorer {
        &self.scorer
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn context(&self) -> ContextSnapshot {
        ContextSnapshot::from_datetime(self.clock.now())
    }

    /// Stored profile, or a fresh one when the shopper is unknown.
    pub async fn profile_or_default(&self, user_id: &str) -> Result<UserProfile> {
        Ok(self
            .store
            .get(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id, self.clock.now())))
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    /// Re-read a stored profile, transform it and persist the result while
    /// holding the shopper's lock. Returns `None` when nothing is stored.
    pub async fn update_profile<F>(&self, user_id: &str, update: F) -> Result<Option<UserProfile>>
    where
        F: FnOnce(UserProfile) -> UserProfile + Send,
    {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let Some(profile) = self.store.get(user_id).await? else {
            return Ok(None);
        };
        let profile = update(profile);
        self.store.put(&profile).await?;

        Ok(Some(profile))
    }

    pub async fn record_interaction(&self, user_id: &str, interaction: Interaction) -> Result<UserProfile> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let now = self.clock.now();
        let context = ContextSnapshot::from_datetime(now);

        let profile = match self.store.get(user_id).await? {
            Some(profile) => profile,
            None => {
                info!(user_id = %user_id, "Creating shopper profile");
                UserProfile::new(user_id, now)
            }
        };

        let profile = self
            .scorer
            .record_interaction(profile, interaction, now, &context);
        self.store.put(&profile).await?;

        Ok(profile)
    }

    /// Validate a storefront payload, then record it.
    pub async fn record_raw_interaction(&self, user_id: &str, raw: RawInteraction) -> Result<UserProfile> {
        let interaction = raw.validate(self.clock.now())?;
        self.record_interaction(user_id, interaction).await
    }

    pub async fn recommend(&self, user_id: &str, limit: usize) -> Result<Vec<Recommendation>> {
        let profile = self.profile_or_default(user_id).await?;
        let products = self.catalog.list();
        let profiles = self.store.list().await?;

        let index = self.similarity_index.read().await.clone();
        let collaborative = match index.as_ref().and_then(|idx| idx.neighbors(user_id)) {
            Some(neighbors) => self
                .scorer
                .score_collaborative_with_neighbors(&profile, &products, neighbors, &profiles),
            None => self.scorer.score_collaborative(&profile, &products, &profiles),
        };
        let fallback = collaborative.fallback;

        let blended = self.scorer.blend(
            &profile,
            &products,
            collaborative,
            limit,
            self.scorer.config().hybrid_weight,
        );
        let recommendations = self.scorer.apply_contextual_boost(blended, &self.context());

        debug!(
            user_id = %user_id,
            returned = recommendations.len(),
            fallback = fallback,
            indexed = index.is_some(),
            "Recommendations generated"
        );

        Ok(recommendations)
    }

    pub async fn install_similarity_index(&self, index: SimilarityIndex) {
        *self.similarity_index.write().await = Some(Arc::new(index));
    }

    pub async fn similarity_index(&self) -> Option<Arc<SimilarityIndex>> {
        self.similarity_index.read().await.clone()
    }
}
