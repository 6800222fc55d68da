pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{PersonalizationError, Result};
pub use jobs::SimilarityBatchJob;
pub use services::{PersonalizationService, RecommendationScorer, SimilarityIndex};
