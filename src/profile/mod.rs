pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::learning::{EffectivenessScores, WeightVector};

pub use store::{JsonProfileStore, ProfileStore};

/// One user's learned engagement patterns. Always replaced wholesale by a
/// learning run, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedProfile {
    pub user_id: String,
    pub optimal_length_min: usize,
    pub optimal_length_max: usize,
    pub effectiveness: EffectivenessScores,
    pub weights: WeightVector,
    pub top_hooks: Vec<String>,
    pub top_ctas: Vec<String>,
    pub sample_size: usize,
    pub avg_engagement_rate: f64,
    pub last_analyzed_at: DateTime<Utc>,
}

impl LearnedProfile {
    pub fn supports_personalization(&self, min_sample_size: usize) -> bool {
        self.sample_size >= min_sample_size && self.weights.is_normalized()
    }

    /// Short plain-text digest handed to the qualitative model.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "Learned from {} posts (avg engagement {:.2}%).",
                self.sample_size, self.avg_engagement_rate
            ),
            format!(
                "Best length: {}-{} characters.",
                self.optimal_length_min, self.optimal_length_max
            ),
        ];

        let strong: Vec<&str> = self
            .effectiveness
            .iter()
            .filter(|(_, score)| *score >= 60)
            .map(|(feature, _)| feature.name())
            .collect();
        if !strong.is_empty() {
            lines.push(format!("Features that work: {}.", strong.join(", ")));
        }

        if let Some(hook) = self.top_hooks.first() {
            lines.push(format!("Best-performing hook: \"{}\"", hook));
        }

        lines.join("\n")
    }
}
