use super::ProfileStore;
use crate::error::Result;
use crate::models::UserProfile;
use async_trait::async_trait;
use dashmap::DashMap;

/// Process-local profile store.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<String, UserProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let store = Self::new();
        for profile in profiles {
            store.profiles.insert(profile.user_id.clone(), profile);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn put(&self, profile: &UserProfile) -> Result<()> {
        self.profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UserProfile>> {
        let mut profiles: Vec<UserProfile> = self
            .profiles
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        profiles.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(profiles)
    }
}
