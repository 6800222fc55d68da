// Ranking strategies:
// - Content-based: affinity-weighted product scoring
// - Collaborative: conversions of similar shoppers
// - Hybrid: rank-normalized blend of both

pub mod collaborative;
pub mod content_based;
pub mod hybrid;

pub use collaborative::{score_from_neighbors, CollaborativeOutcome};
pub use content_based::{content_score, score_content_based};
pub use hybrid::{combine_rankings, rank_score};
