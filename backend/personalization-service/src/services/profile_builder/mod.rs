// ============================================
// Shopper Profile Builder
// ============================================
//
// Builds shopper profiles from storefront interactions:
// 1. Weighted category / brand affinities
// 2. Observed and preferred price ranges
// 3. Style token counts
// 4. Purchase metrics (conversion rate, order value, lifetime value)
//
// Catalog products are tagged with season and occasion once at load time
// so that context boosts can match against them.

pub mod interaction_recorder;
pub mod product_tagger;

pub use interaction_recorder::{decay_stored_affinities, InteractionRecorder};
pub use product_tagger::ProductTagger;
