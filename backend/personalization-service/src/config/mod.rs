use crate::error::{PersonalizationError, Result};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    pub redis: RedisConfig,
    pub catalog: CatalogConfig,
    pub scoring: ScoringConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service_name: String,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// 0 disables expiry on stored profiles
    pub profile_ttl_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub path: String,
}

/// Tunables of the scoring pipeline, read from `SCORER_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Behavior history cap; oldest interactions are evicted first
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
    /// Maximum neighbours consulted by collaborative scoring
    #[serde(default = "default_neighbor_limit")]
    pub neighbor_limit: usize,
    #[serde(default = "default_hybrid_weight")]
    pub hybrid_weight: f64,
    #[serde(default = "default_diversity_factor")]
    pub diversity_factor: f64,
    /// Multiplier for matching season or time of day, clamped to >= 0
    #[serde(
        default = "default_context_boost",
        deserialize_with = "deserialize_non_negative"
    )]
    pub context_boost: f64,
    /// Purchases needed before the preferred price range is derived
    #[serde(default = "default_min_purchases_for_price_range")]
    pub min_purchases_for_price_range: usize,
    /// Static multiplier per category; unlisted categories weigh 1.0
    #[serde(skip, default = "default_category_weights")]
    pub category_weights: HashMap<String, f64>,
}

fn default_max_history() -> usize {
    100
}

fn default_min_similarity() -> f64 {
    0.1
}

fn default_neighbor_limit() -> usize {
    5
}

fn default_hybrid_weight() -> f64 {
    0.7
}

fn default_diversity_factor() -> f64 {
    0.3
}

fn default_context_boost() -> f64 {
    1.2
}

fn deserialize_non_negative<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(f64::deserialize(deserializer)?.max(0.0))
}

fn default_min_purchases_for_price_range() -> usize {
    5
}

fn default_category_weights() -> HashMap<String, f64> {
    HashMap::new()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            min_similarity: default_min_similarity(),
            neighbor_limit: default_neighbor_limit(),
            hybrid_weight: default_hybrid_weight(),
            diversity_factor: default_diversity_factor(),
            context_boost: default_context_boost(),
            min_purchases_for_price_range: default_min_purchases_for_price_range(),
            category_weights: default_category_weights(),
        }
    }
}

impl ScoringConfig {
    pub fn with_category_weight(mut self, category: impl Into<String>, weight: f64) -> Self {
        self.category_weights.insert(category.into(), weight.max(0.0));
        self
    }

    pub fn category_weight(&self, category: &str) -> f64 {
        self.category_weights.get(category).copied().unwrap_or(1.0)
    }
}

/// Similarity batch job settings, read from `BATCH_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Exit after one pass instead of looping
    #[serde(default = "default_run_once")]
    pub run_once: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Neighbours kept per user in the similarity index
    #[serde(default = "default_index_neighbors")]
    pub index_neighbors: usize,
    /// Half-life for stored affinity decay; unset keeps affinities untouched
    #[serde(default)]
    pub affinity_half_life_hours: Option<f64>,
}

fn default_run_once() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    900
}

fn default_index_neighbors() -> usize {
    20
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            run_once: default_run_once(),
            interval_secs: default_interval_secs(),
            index_neighbors: default_index_neighbors(),
            affinity_half_life_hours: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let scoring = envy::prefixed("SCORER_")
            .from_env::<ScoringConfig>()
            .map_err(|e| PersonalizationError::Config(e.to_string()))?;
        let batch = envy::prefixed("BATCH_")
            .from_env::<BatchConfig>()
            .map_err(|e| PersonalizationError::Config(e.to_string()))?;

        Ok(Config {
            service: ServiceConfig {
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "personalization-service".to_string()),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                profile_ttl_secs: parse_var("PROFILE_TTL_SECS", 0)?,
            },
            catalog: CatalogConfig {
                path: env::var("CATALOG_PATH")
                    .unwrap_or_else(|_| "data/catalog.json".to_string()),
            },
            scoring,
            batch,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| PersonalizationError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
