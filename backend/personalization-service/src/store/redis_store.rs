use super::ProfileStore;
use crate::error::Result;
use crate::models::UserProfile;
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, warn};

/// Redis key prefixes
const PROFILE_KEY: &str = "shopper:profile:";
const PROFILE_INDEX_KEY: &str = "shopper:profiles";

/// Profiles stored as JSON strings, with a set indexing every user id.
pub struct RedisProfileStore {
    redis: redis::Client,
    /// 0 disables expiry
    ttl_secs: u64,
}

impl RedisProfileStore {
    pub fn new(redis: redis::Client, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    pub fn from_url(url: &str, ttl_secs: u64) -> Result<Self> {
        Ok(Self::new(redis::Client::open(url)?, ttl_secs))
    }

    fn profile_key(user_id: &str) -> String {
        format!("{}{}", PROFILE_KEY, user_id)
    }
}

#[async_trait]
impl ProfileStore for RedisProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let json: Option<String> = conn.get(Self::profile_key(user_id)).await?;

        match json {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, profile: &UserProfile) -> Result<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let key = Self::profile_key(&profile.user_id);
        let json = serde_json::to_string(profile)?;

        if self.ttl_secs > 0 {
            let _: () = conn.set_ex(&key, &json, self.ttl_secs).await?;
        } else {
            let _: () = conn.set(&key, &json).await?;
        }
        let _: () = conn.sadd(PROFILE_INDEX_KEY, &profile.user_id).await?;

        debug!(user_id = %profile.user_id, "Persisted shopper profile");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UserProfile>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let mut user_ids: Vec<String> = conn.smembers(PROFILE_INDEX_KEY).await?;
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        user_ids.sort();

        let keys: Vec<String> = user_ids.iter().map(|id| Self::profile_key(id)).collect();
        let payloads: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;

        let mut profiles = Vec::with_capacity(payloads.len());
        for (user_id, payload) in user_ids.iter().zip(payloads) {
            match payload {
                Some(data) => match serde_json::from_str::<UserProfile>(&data) {
                    Ok(profile) => profiles.push(profile),
                    Err(e) => warn!(user_id = %user_id, error = %e, "Skipping unreadable profile"),
                },
                // Expired since it was indexed
                None => {
                    let _: () = conn.srem(PROFILE_INDEX_KEY, user_id).await?;
                }
            }
        }

        Ok(profiles)
    }
}
