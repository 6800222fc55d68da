pub mod context;
pub mod diversity;
pub mod personalization;
pub mod profile_builder;
pub mod ranking;
pub mod scorer;
pub mod similarity;

pub use context::ContextualBooster;
pub use diversity::CategoryDiversityFilter;
pub use personalization::PersonalizationService;
pub use scorer::RecommendationScorer;
pub use similarity::SimilarityIndex;
