use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::augment::{AugmentRequest, QualitativeAugmenter, QualitativeFeedback};
use crate::config::EngineConfig;
use crate::error::{AugmentError, EngineError};
use crate::history::{HistoricalPost, HistorySource};
use crate::learning::{analyze_history, build_insights, Insights, LearningStage};
use crate::profile::{LearnedProfile, ProfileStore};
use crate::scoring::{is_degenerate, score_draft};
use crate::{Draft, ScoreResult};

#[derive(Debug, Clone)]
pub struct LearnReport {
    pub profile: LearnedProfile,
    pub insights: Insights,
}

/// Entry point for learning runs, profile lookups and draft scoring.
#[derive(Clone)]
pub struct EngagementEngine {
    config: EngineConfig,
    store: Arc<dyn ProfileStore>,
    history: Option<Arc<dyn HistorySource>>,
    augmenter: Option<Arc<dyn QualitativeAugmenter>>,
}

impl EngagementEngine {
    pub fn new(config: EngineConfig, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            config,
            store,
            history: None,
            augmenter: None,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn HistorySource>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_augmenter(mut self, augmenter: Arc<dyn QualitativeAugmenter>) -> Self {
        self.augmenter = Some(augmenter);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn has_augmenter(&self) -> bool {
        self.augmenter.is_some()
    }

    /// Runs a full learning pass and replaces the stored profile. Any failure
    /// leaves a previously stored profile untouched.
    pub async fn learn(&self, user_id: &str) -> Result<LearnReport, EngineError> {
        info!(user_id, stage = %LearningStage::FetchHistory, "learning run started");
        let posts = self.fetch_history(user_id).await?;

        let profile = analyze_history(user_id, &posts, &self.config.learning, Utc::now())
            .map_err(|err| {
                info!(user_id, error = %err, "learning run stopped");
                err
            })?;

        info!(user_id, stage = %LearningStage::UpsertProfile, sample_size = profile.sample_size);
        let profile = self.store.upsert(profile).await.map_err(|err| {
            warn!(user_id, error = %err, "profile upsert failed");
            EngineError::StoreUnavailable(err)
        })?;

        info!(
            user_id,
            stage = %LearningStage::Done,
            hook_weight = profile.weights.hook,
            reply_weight = profile.weights.reply_potential,
            "learning run complete"
        );
        let insights = build_insights(&profile);
        Ok(LearnReport { profile, insights })
    }

    pub async fn learned_profile(&self, user_id: &str) -> Result<Option<LearnedProfile>, EngineError> {
        self.store
            .get(user_id)
            .await
            .map_err(EngineError::StoreUnavailable)
    }

    /// Never fails for a well-formed draft: store errors fall back to the
    /// default weights.
    pub async fn score_draft(&self, user_id: Option<&str>, draft: &Draft) -> ScoreResult {
        if is_degenerate(draft, &self.config.scoring) {
            return score_draft(draft, None, &self.config.scoring);
        }

        let profile = match user_id {
            Some(user_id) => self.lookup_profile(user_id).await,
            None => None,
        };
        score_draft(draft, profile.as_ref(), &self.config.scoring)
    }

    pub async fn augment_draft(
        &self,
        user_id: Option<&str>,
        draft: &Draft,
    ) -> Result<QualitativeFeedback, AugmentError> {
        if is_degenerate(draft, &self.config.scoring) {
            return Err(AugmentError::DraftTooShort);
        }
        let augmenter = self.augmenter.as_ref().ok_or(AugmentError::NotConfigured)?;

        let profile_summary = match user_id {
            Some(user_id) => self
                .lookup_profile(user_id)
                .await
                .map(|profile| profile.summary()),
            None => None,
        };
        let request = AugmentRequest {
            draft: draft.clone(),
            profile_summary,
        };

        let timeout = self.config.augment.timeout();
        let result = match tokio::time::timeout(timeout, augmenter.augment(&request)).await {
            Ok(Ok(feedback)) => Ok(feedback),
            Ok(Err(err)) => Err(AugmentError::Failed(err)),
            Err(_) => Err(AugmentError::Timeout(self.config.augment.timeout_ms)),
        };
        if let Err(err) = &result {
            warn!(error = %err, "qualitative feedback omitted");
        }
        result
    }

    async fn lookup_profile(&self, user_id: &str) -> Option<LearnedProfile> {
        match self.store.get(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(user_id, error = %err, "profile lookup failed, using default weights");
                None
            }
        }
    }

    async fn fetch_history(&self, user_id: &str) -> Result<Vec<HistoricalPost>, EngineError> {
        let history = self.history.as_ref().ok_or_else(|| {
            EngineError::UpstreamFetchFailed("no history source configured".to_string())
        })?;
        let limit = self.config.learning.history_limit;
        match history.fetch_recent(user_id, limit).await {
            Ok(posts) => Ok(posts),
            Err(first) => {
                warn!(user_id, error = %first, "history fetch failed, retrying once");
                tokio::time::sleep(self.config.learning.retry_backoff()).await;
                history
                    .fetch_recent(user_id, limit)
                    .await
                    .map_err(|err| {
                        warn!(user_id, error = %err, "history fetch failed after retry");
                        EngineError::UpstreamFetchFailed(err)
                    })
            }
        }
    }
}
