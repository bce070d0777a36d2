use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Draft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementType {
    Replies,
    Reposts,
    Likes,
    Mixed,
}

impl EngagementType {
    pub fn from_str(value: &str) -> Option<Self> {
        let lowercase = value.trim().to_lowercase();
        if lowercase.starts_with("repl") {
            Some(EngagementType::Replies)
        } else if lowercase.starts_with("repost") || lowercase.starts_with("retweet") {
            Some(EngagementType::Reposts)
        } else if lowercase.starts_with("like") {
            Some(EngagementType::Likes)
        } else if lowercase.starts_with("mix") {
            Some(EngagementType::Mixed)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitativeFeedback {
    #[serde(default)]
    pub hook_rewrite: Option<String>,
    #[serde(default, deserialize_with = "lenient_engagement")]
    pub predicted_engagement: Option<EngagementType>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl QualitativeFeedback {
    pub fn is_empty(&self) -> bool {
        self.hook_rewrite.is_none()
            && self.predicted_engagement.is_none()
            && self.tone.is_none()
            && self.suggestions.is_empty()
    }

    fn normalized(mut self) -> Self {
        self.hook_rewrite = non_blank(self.hook_rewrite);
        self.tone = non_blank(self.tone);
        self.suggestions = self
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .take(6)
            .collect();
        self
    }
}

fn lenient_engagement<'de, D>(deserializer: D) -> Result<Option<EngagementType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(EngagementType::from_str))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().trim_matches('"').trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct AugmentRequest {
    pub draft: Draft,
    pub profile_summary: Option<String>,
}

#[async_trait]
pub trait QualitativeAugmenter: Send + Sync {
    async fn augment(&self, request: &AugmentRequest) -> Result<QualitativeFeedback, String>;
}

type ParseStrategy = fn(&str) -> Option<QualitativeFeedback>;

const PARSE_STRATEGIES: [(&str, ParseStrategy); 4] = [
    ("whole_json", parse_whole_json),
    ("fenced_json", parse_fenced_json),
    ("embedded_json", parse_embedded_json),
    ("labelled_lines", parse_labelled_lines),
];

pub fn parse_feedback(raw: &str) -> Option<QualitativeFeedback> {
    for (name, strategy) in PARSE_STRATEGIES {
        if let Some(feedback) = strategy(raw) {
            let feedback = feedback.normalized();
            if !feedback.is_empty() {
                tracing::debug!(strategy = name, "parsed qualitative feedback");
                return Some(feedback);
            }
        }
    }
    None
}

fn parse_whole_json(raw: &str) -> Option<QualitativeFeedback> {
    serde_json::from_str(raw.trim()).ok()
}

fn parse_fenced_json(raw: &str) -> Option<QualitativeFeedback> {
    let start = raw.find("```")?;
    let after = &raw[start + 3..];
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let end = body.find("```")?;
    serde_json::from_str(body[..end].trim()).ok()
}

fn parse_embedded_json(raw: &str) -> Option<QualitativeFeedback> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if start >= end {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn parse_labelled_lines(raw: &str) -> Option<QualitativeFeedback> {
    let mut feedback = QualitativeFeedback::default();
    for line in raw.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            feedback.suggestions.push(rest.to_string());
            continue;
        }
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        match label.trim().to_lowercase().as_str() {
            "hook rewrite" | "hook" | "rewrite" => {
                feedback.hook_rewrite = Some(value.to_string());
            }
            "predicted engagement" | "engagement" => {
                feedback.predicted_engagement = EngagementType::from_str(value);
            }
            "tone" => feedback.tone = Some(value.to_string()),
            _ => {}
        }
    }
    Some(feedback)
}
