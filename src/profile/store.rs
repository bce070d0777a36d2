use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::profile::LearnedProfile;

/// Key-value persistence for learned profiles, keyed by user id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<LearnedProfile>, String>;

    /// Replaces the whole profile in a single write. An older snapshot never
    /// overwrites a newer one.
    async fn upsert(&self, profile: LearnedProfile) -> Result<LearnedProfile, String>;
}

pub struct JsonProfileStore {
    path: PathBuf,
    profiles: RwLock<HashMap<String, LearnedProfile>>,
}

impl JsonProfileStore {
    pub async fn load(path: PathBuf) -> Result<Self, String> {
        let profiles = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| format!("failed to read profiles: {}", err))?;
            if data.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&data)
                    .map_err(|err| format!("failed to parse profiles: {}", err))?
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            profiles: RwLock::new(profiles),
        })
    }

    pub async fn list(&self) -> Vec<LearnedProfile> {
        let guard = self.profiles.read().await;
        guard.values().cloned().collect()
    }

    async fn persist(&self, profiles: &HashMap<String, LearnedProfile>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(profiles)
            .map_err(|err| format!("failed to serialize profiles: {}", err))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload)
            .await
            .map_err(|err| format!("failed to write profiles: {}", err))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| format!("failed to finalize profiles: {}", err))?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<LearnedProfile>, String> {
        let guard = self.profiles.read().await;
        Ok(guard.get(user_id).cloned())
    }

    async fn upsert(&self, profile: LearnedProfile) -> Result<LearnedProfile, String> {
        let mut guard = self.profiles.write().await;
        if let Some(existing) = guard.get(&profile.user_id) {
            if existing.last_analyzed_at > profile.last_analyzed_at {
                return Ok(existing.clone());
            }
        }

        let mut next = guard.clone();
        next.insert(profile.user_id.clone(), profile.clone());
        self.persist(&next).await?;
        *guard = next;
        Ok(profile)
    }
}

async fn ensure_dir(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| format!("failed to create profile dir: {}", err))
}
