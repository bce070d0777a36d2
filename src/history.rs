use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPost {
    pub text: String,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub impressions: u64,
}

impl HistoricalPost {
    pub fn new(
        text: impl Into<String>,
        like_count: u64,
        retweet_count: u64,
        reply_count: u64,
        impressions: u64,
    ) -> Self {
        Self {
            text: text.into(),
            like_count,
            retweet_count,
            reply_count,
            impressions,
        }
    }

    /// Replies count 10x and retweets 5x relative to likes.
    pub fn engagement_rate(&self) -> f64 {
        let weighted = self.reply_count as f64 * 10.0
            + self.retweet_count as f64 * 5.0
            + self.like_count as f64;
        weighted / self.impressions.max(1) as f64 * 100.0
    }

    pub fn is_usable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Supplies a user's most recent original posts.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_recent(&self, user_id: &str, limit: usize)
        -> Result<Vec<HistoricalPost>, String>;
}

/// Reads history from JSON: either a single file holding an array of posts,
/// or a directory of `<user_id>.json` files.
pub struct FileHistorySource {
    path: PathBuf,
    impression_estimate: u64,
}

impl FileHistorySource {
    pub fn new(path: PathBuf, impression_estimate: u64) -> Self {
        Self {
            path,
            impression_estimate,
        }
    }

    fn resolve(&self, user_id: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.json", user_id))
        } else {
            self.path.clone()
        }
    }
}

#[async_trait]
impl HistorySource for FileHistorySource {
    async fn fetch_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoricalPost>, String> {
        let path = self.resolve(user_id);
        let data = tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| format!("failed to read history {}: {}", path.display(), err))?;
        let posts: Vec<HistoricalPost> = serde_json::from_str(&data)
            .map_err(|err| format!("failed to parse history {}: {}", path.display(), err))?;

        Ok(posts
            .into_iter()
            .take(limit)
            .map(|mut post| {
                if post.impressions == 0 {
                    post.impressions = self.impression_estimate;
                }
                post
            })
            .collect())
    }
}
