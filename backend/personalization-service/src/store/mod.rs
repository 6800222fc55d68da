// ============================================
// Collaborators (外部協作者)
// ============================================
//
// Interfaces the scorer depends on, injected rather than global:
// - ProfileStore: key-value persistence of shopper profiles
// - ProductCatalog: read-only product list, loaded once per session
// - Clock: "now", injectable so time weighting is testable

pub mod catalog;
pub mod memory;
pub mod redis_store;

pub use catalog::InMemoryCatalog;
pub use memory::InMemoryProfileStore;
pub use redis_store::RedisProfileStore;

use crate::error::Result;
use crate::models::{Product, UserProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Profile persistence. Any key-value backend satisfies it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>>;

    async fn put(&self, profile: &UserProfile) -> Result<()>;

    /// All stored profiles, ordered by user id.
    async fn list(&self) -> Result<Vec<UserProfile>>;
}

pub trait ProductCatalog: Send + Sync {
    fn list(&self) -> Vec<Product>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
