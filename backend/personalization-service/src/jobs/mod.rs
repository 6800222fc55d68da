// ============================================
// Background Jobs Module (後台任務模組)
// ============================================
//
// Contains background job runners for:
// 1. Similarity index recomputation
// 2. Optional stored-affinity decay
//
// These jobs are triggered by the host:
// - One-shot process (BATCH_RUN_ONCE=true)
// - Built-in interval loop (BATCH_RUN_ONCE=false)

pub mod similarity_batch;

pub use similarity_batch::{BatchJobStats, SimilarityBatchJob};
