use anyhow::Context;
use personalization_service::{
    store::{InMemoryCatalog, RedisProfileStore, SystemClock},
    Config, PersonalizationService, RecommendationScorer, SimilarityBatchJob,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env().context("Failed to load config")?;

    info!(
        service = %config.service.service_name,
        catalog = %config.catalog.path,
        run_once = config.batch.run_once,
        "Starting similarity batch runner"
    );

    let store = RedisProfileStore::from_url(&config.redis.url, config.redis.profile_ttl_secs)
        .context("Failed to create Redis client")?;
    let catalog = InMemoryCatalog::from_path(&config.catalog.path)
        .context("Failed to load product catalog")?;

    let service = Arc::new(PersonalizationService::new(
        Arc::new(store),
        Arc::new(catalog),
        Arc::new(SystemClock),
        RecommendationScorer::new(config.scoring.clone()),
    ));

    let job = SimilarityBatchJob::new(config.batch.clone(), service);
    let stats = job.run().await.context("Similarity batch job failed")?;

    info!(
        profiles = stats.profiles_loaded,
        indexed = stats.indexed_users,
        pairs = stats.neighbor_pairs,
        duration_ms = stats.total_duration_ms,
        "Similarity batch job completed"
    );

    Ok(())
}
