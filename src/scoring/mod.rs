pub mod factors;
pub mod weighted;

pub use factors::{length_score, LengthBand};
pub use weighted::{FactorWeights, WeightedScorer};

use crate::config::ScoringConfig;
use crate::features::extract_text_signals;
use crate::learning::DEFAULT_WEIGHTS;
use crate::profile::LearnedProfile;
use crate::{ColorBucket, Draft, Factor, FactorResult, ScoreResult};

pub const DEGENERATE_SCORE: u32 = 10;

pub fn is_degenerate(draft: &Draft, config: &ScoringConfig) -> bool {
    draft.text.trim().chars().count() < config.degenerate_min_chars
}

/// Scores a draft. A profile only personalizes the result when it carries
/// enough samples; otherwise the default weights and sweet spot apply.
pub fn score_draft(
    draft: &Draft,
    profile: Option<&LearnedProfile>,
    config: &ScoringConfig,
) -> ScoreResult {
    if is_degenerate(draft, config) {
        return degenerate_result();
    }

    let profile = profile.filter(|profile| profile.supports_personalization(config.min_sample_size));

    let (weights, band) = match profile {
        Some(profile) => (
            FactorWeights::from(&profile.weights),
            LengthBand::new(profile.optimal_length_min, profile.optimal_length_max),
        ),
        None => (
            FactorWeights::from(&DEFAULT_WEIGHTS),
            LengthBand::sweet_spot(config),
        ),
    };

    let text = draft.text.trim();
    let signals = extract_text_signals(text);
    let factors = vec![
        factors::hook_strength(&signals),
        factors::reply_potential(&signals),
        factors::length_optimization(signals.char_count, band),
        factors::readability(&signals),
        factors::engagement_triggers(&signals, config),
    ];

    let score = WeightedScorer::new(weights).score(&factors);

    ScoreResult {
        score,
        color_bucket: ColorBucket::from_score(score),
        factors,
        personalized: profile.is_some(),
    }
}

pub fn degenerate_result() -> ScoreResult {
    let factors = Factor::ALL
        .iter()
        .map(|factor| FactorResult {
            name: *factor,
            raw_score: 1,
            feedback: "Write at least a full sentence before scoring.".to_string(),
        })
        .collect();

    ScoreResult {
        score: DEGENERATE_SCORE,
        color_bucket: ColorBucket::from_score(DEGENERATE_SCORE),
        factors,
        personalized: false,
    }
}
