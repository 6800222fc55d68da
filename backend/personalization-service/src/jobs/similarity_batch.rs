// ============================================
// Similarity Batch Job (相似度批量重算任務)
// ============================================
//
// Recomputes shopper-to-shopper similarity over every stored profile and
// installs the result in the service. Triggered explicitly; the host
// decides when (one-shot process, CronJob, or the built-in loop below).
//
// Workflow:
// 1. Load all profiles from the store
// 2. Optionally decay stored affinities (only when a half-life is set),
//    re-reading each profile under the shopper's write lock
// 3. Build the similarity index
// 4. Install it for collaborative scoring

use crate::config::BatchConfig;
use crate::error::Result;
use crate::services::profile_builder::decay_stored_affinities;
use crate::services::{PersonalizationService, SimilarityIndex};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Similarity batch job statistics
#[derive(Debug, Clone, Default)]
pub struct BatchJobStats {
    pub run_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub profiles_loaded: u32,
    pub profiles_decayed: u32,
    pub decay_failures: u32,
    pub indexed_users: u32,
    pub neighbor_pairs: u32,
    pub total_duration_ms: u64,
}

pub struct SimilarityBatchJob {
    config: BatchConfig,
    service: Arc<PersonalizationService>,
}

impl SimilarityBatchJob {
    pub fn new(config: BatchConfig, service: Arc<PersonalizationService>) -> Self {
        Self { config, service }
    }

    /// Run the batch job
    pub async fn run(&self) -> Result<BatchJobStats> {
        loop {
            let stats = match self.run_single_pass().await {
                Ok(stats) => stats,
                Err(e) if !self.config.run_once => {
                    error!(error = %e, "Similarity batch pass failed");
                    sleep(Duration::from_secs(self.config.interval_secs)).await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.config.run_once {
                return Ok(stats);
            }

            info!(
                interval_secs = self.config.interval_secs,
                "Sleeping until next pass"
            );
            sleep(Duration::from_secs(self.config.interval_secs)).await;
        }
    }

    /// Run a single pass of the batch job
    pub async fn run_single_pass(&self) -> Result<BatchJobStats> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4();
        let mut stats = BatchJobStats {
            run_id: Some(run_id),
            started_at: Some(self.service.clock().now()),
            ..Default::default()
        };

        info!(
            run_id = %run_id,
            index_neighbors = self.config.index_neighbors,
            decay_enabled = self.config.affinity_half_life_hours.is_some(),
            "Starting similarity batch pass"
        );

        let mut profiles = self.service.store().list().await?;
        stats.profiles_loaded = profiles.len() as u32;

        if let Some(half_life) = self.config.affinity_half_life_hours {
            let now = self.service.clock().now();
            for profile in profiles.iter_mut() {
                let result = self
                    .service
                    .update_profile(&profile.user_id, |latest| {
                        decay_stored_affinities(latest, now, half_life)
                    })
                    .await;
                match result {
                    Ok(Some(decayed)) => {
                        stats.profiles_decayed += 1;
                        *profile = decayed;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        stats.decay_failures += 1;
                        warn!(
                            user_id = %profile.user_id,
                            error = %e,
                            "Failed to persist decayed profile"
                        );
                    }
                }
            }
        }

        let min_similarity = self.service.scorer().config().min_similarity;
        let index = SimilarityIndex::build(&profiles, min_similarity, self.config.index_neighbors);
        stats.indexed_users = index.len() as u32;
        stats.neighbor_pairs = profiles
            .iter()
            .filter_map(|p| index.neighbors(&p.user_id))
            .map(|n| n.len() as u32)
            .sum();

        self.service.install_similarity_index(index).await;

        stats.completed_at = Some(self.service.clock().now());
        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            run_id = %run_id,
            profiles = stats.profiles_loaded,
            decayed = stats.profiles_decayed,
            indexed = stats.indexed_users,
            pairs = stats.neighbor_pairs,
            duration_ms = stats.total_duration_ms,
            "Similarity batch pass completed"
        );

        Ok(stats)
    }
}
