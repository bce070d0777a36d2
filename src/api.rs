use engagement_patterns::augment::QualitativeFeedback;
use engagement_patterns::{
    Draft, EngineError, FactorResult, Insights, LearnReport, LearnedProfile, PostType,
    ScoreResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ApiLearnRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiLearnResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<LearnedProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweets_found: Option<usize>,
}

impl ApiLearnResponse {
    pub fn from_result(result: Result<LearnReport, EngineError>) -> Self {
        match result {
            Ok(report) => Self {
                success: true,
                patterns: Some(report.profile),
                insights: Some(report.insights),
                error: None,
                message: None,
                tweets_found: None,
            },
            Err(err) => {
                let tweets_found = match &err {
                    EngineError::InsufficientHistory { found, .. } => Some(*found),
                    _ => None,
                };
                Self {
                    success: false,
                    patterns: None,
                    insights: None,
                    error: Some(err.code().to_string()),
                    message: Some(err.to_string()),
                    tweets_found,
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiProfileResponse {
    Found(LearnedProfile),
    Missing { has_patterns: bool },
}

impl ApiProfileResponse {
    pub fn from_profile(profile: Option<LearnedProfile>) -> Self {
        match profile {
            Some(profile) => ApiProfileResponse::Found(profile),
            None => ApiProfileResponse::Missing {
                has_patterns: false,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiScoreRequest {
    pub text: Option<String>,
    pub user_id: Option<String>,
    pub post_type: Option<String>,
    pub reply_context: Option<String>,
    pub request_id: Option<String>,
    pub use_ai: Option<bool>,
}

impl ApiScoreRequest {
    pub fn to_draft(&self) -> Result<Draft, String> {
        let text = self.text.clone().unwrap_or_default();
        if text.trim().is_empty() {
            return Err("text is required".to_string());
        }

        let post_type = match self.post_type.as_deref() {
            Some(value) => PostType::from_str(value)
                .ok_or_else(|| format!("invalid post type: {}", value))?,
            None => PostType::Tweet,
        };

        Ok(Draft {
            text,
            post_type,
            reply_context: self
                .reply_context
                .clone()
                .filter(|context| !context.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentationStatus {
    Pending,
    Disabled,
    Unavailable,
}

#[derive(Debug, Serialize)]
pub struct ApiScoreResponse {
    pub request_id: String,
    pub score: u32,
    pub color_bucket: String,
    pub factors: Vec<FactorResult>,
    pub personalized: bool,
    pub augmentation: AugmentationStatus,
}

impl ApiScoreResponse {
    pub fn from_result(
        result: ScoreResult,
        request_id: String,
        augmentation: AugmentationStatus,
    ) -> Self {
        Self {
            request_id,
            score: result.score,
            color_bucket: result.color_bucket.label().to_string(),
            factors: result.factors,
            personalized: result.personalized,
            augmentation,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiFeedbackEvent {
    pub request_id: String,
    pub feedback: QualitativeFeedback,
}
