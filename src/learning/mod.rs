//! Builds a `LearnedProfile` from post history; fetch and persist live in `engine`.

pub mod cohort;
pub mod effectiveness;
pub mod exemplars;
pub mod weights;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::LearningConfig;
use crate::error::EngineError;
use crate::features::Feature;
use crate::history::HistoricalPost;
use crate::profile::LearnedProfile;

pub use cohort::{partition, rank_by_engagement, Cohorts};
pub use effectiveness::{effectiveness, estimate, EffectivenessScores, NEUTRAL_EFFECTIVENESS};
pub use exemplars::{optimal_length_band, top_ctas, top_hooks};
pub use weights::{rescale, synthesize, WeightVector, DEFAULT_WEIGHTS, WEIGHT_TOTAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningStage {
    FetchHistory,
    Partition,
    Estimate,
    SynthesizeWeights,
    ExtractExemplars,
    UpsertProfile,
    Done,
}

impl fmt::Display for LearningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LearningStage::FetchHistory => "fetch_history",
            LearningStage::Partition => "partition",
            LearningStage::Estimate => "estimate",
            LearningStage::SynthesizeWeights => "synthesize_weights",
            LearningStage::ExtractExemplars => "extract_exemplars",
            LearningStage::UpsertProfile => "upsert_profile",
            LearningStage::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub summary: String,
    pub what_works: Vec<String>,
    pub optimal_length: String,
    pub top_hooks: Vec<String>,
}

/// Pure part of a learning run. Blank posts are dropped before the
/// minimum-history check.
pub fn analyze_history(
    user_id: &str,
    posts: &[HistoricalPost],
    config: &LearningConfig,
    analyzed_at: DateTime<Utc>,
) -> Result<LearnedProfile, EngineError> {
    let usable: Vec<HistoricalPost> = posts.iter().filter(|p| p.is_usable()).cloned().collect();
    if usable.len() < config.min_history {
        return Err(EngineError::InsufficientHistory {
            found: usable.len(),
            required: config.min_history,
        });
    }

    tracing::debug!(user_id, stage = %LearningStage::Partition, posts = usable.len());
    let ranked = rank_by_engagement(&usable);
    let cohorts = partition(&ranked, config);

    tracing::debug!(
        user_id,
        stage = %LearningStage::Estimate,
        top = cohorts.top.len(),
        middle = cohorts.middle.len()
    );
    let effectiveness = estimate(&cohorts);

    tracing::debug!(user_id, stage = %LearningStage::SynthesizeWeights);
    let weights = synthesize(&effectiveness);

    tracing::debug!(user_id, stage = %LearningStage::ExtractExemplars);
    let (optimal_length_min, optimal_length_max) = optimal_length_band(&cohorts.top);
    let hooks = top_hooks(&cohorts.top, config.max_exemplars);
    let ctas = top_ctas(&cohorts.top, config.max_exemplars);

    let avg_engagement_rate =
        usable.iter().map(HistoricalPost::engagement_rate).sum::<f64>() / usable.len() as f64;

    Ok(LearnedProfile {
        user_id: user_id.to_string(),
        optimal_length_min,
        optimal_length_max,
        effectiveness,
        weights,
        top_hooks: hooks,
        top_ctas: ctas,
        sample_size: usable.len(),
        avg_engagement_rate,
        last_analyzed_at: analyzed_at,
    })
}

pub fn build_insights(profile: &LearnedProfile) -> Insights {
    let what_works: Vec<String> = profile
        .effectiveness
        .iter()
        .filter(|(_, score)| *score >= 60)
        .map(|(feature, score)| describe_feature(feature, score))
        .collect();

    let summary = if what_works.is_empty() {
        format!(
            "Analyzed {} posts averaging {:.2}% engagement. No single feature stands out yet; keep experimenting.",
            profile.sample_size, profile.avg_engagement_rate
        )
    } else {
        format!(
            "Analyzed {} posts averaging {:.2}% engagement. {} pattern{} clearly lift your top posts.",
            profile.sample_size,
            profile.avg_engagement_rate,
            what_works.len(),
            if what_works.len() == 1 { "" } else { "s" }
        )
    };

    Insights {
        summary,
        what_works,
        optimal_length: format!(
            "{}-{} characters",
            profile.optimal_length_min, profile.optimal_length_max
        ),
        top_hooks: profile.top_hooks.iter().take(3).cloned().collect(),
    }
}

fn describe_feature(feature: Feature, score: u32) -> String {
    let label = match feature {
        Feature::Questions => "Questions",
        Feature::Numbers => "Specific numbers",
        Feature::BoldClaims => "Bold claims",
        Feature::Lists => "Lists",
        Feature::Emojis => "Emojis",
    };
    format!(
        "{} show up {:.1}x more often in your top posts",
        label,
        score as f64 / NEUTRAL_EFFECTIVENESS as f64
    )
}
