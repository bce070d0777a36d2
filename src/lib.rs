pub mod augment;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod history;
pub mod learning;
pub mod profile;
pub mod scoring;

use serde::{Deserialize, Serialize};

pub use engine::{EngagementEngine, LearnReport};
pub use error::{AugmentError, EngineError};
pub use learning::{Insights, WeightVector, DEFAULT_WEIGHTS};
pub use profile::LearnedProfile;
pub use scoring::score_draft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[default]
    Tweet,
    Reply,
    Quote,
    Thread,
}

impl PostType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "tweet" | "post" => Some(PostType::Tweet),
            "reply" => Some(PostType::Reply),
            "quote" => Some(PostType::Quote),
            "thread" => Some(PostType::Thread),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostType::Tweet => "tweet",
            PostType::Reply => "reply",
            PostType::Quote => "quote",
            PostType::Thread => "thread",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Draft {
    pub text: String,
    #[serde(default)]
    pub post_type: PostType,
    #[serde(default)]
    pub reply_context: Option<String>,
}

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_post_type(mut self, post_type: PostType) -> Self {
        self.post_type = post_type;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBucket {
    Green,
    Yellow,
    Red,
}

impl ColorBucket {
    pub fn from_score(score: u32) -> Self {
        if score >= 70 {
            ColorBucket::Green
        } else if score >= 40 {
            ColorBucket::Yellow
        } else {
            ColorBucket::Red
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorBucket::Green => "green",
            ColorBucket::Yellow => "yellow",
            ColorBucket::Red => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    HookStrength,
    ReplyPotential,
    LengthOptimization,
    Readability,
    EngagementTriggers,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::HookStrength,
        Factor::ReplyPotential,
        Factor::LengthOptimization,
        Factor::Readability,
        Factor::EngagementTriggers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Factor::HookStrength => "Hook Strength",
            Factor::ReplyPotential => "Reply Potential",
            Factor::LengthOptimization => "Length Optimization",
            Factor::Readability => "Readability",
            Factor::EngagementTriggers => "Engagement Triggers",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorResult {
    pub name: Factor,
    pub raw_score: u32,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub color_bucket: ColorBucket,
    pub factors: Vec<FactorResult>,
    pub personalized: bool,
}

impl ScoreResult {
    pub fn factor(&self, factor: Factor) -> Option<&FactorResult> {
        self.factors.iter().find(|result| result.name == factor)
    }
}
