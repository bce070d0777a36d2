use serde::{Deserialize, Serialize};

use crate::features::{Detector, Feature, TRACKED_FEATURES};
use crate::history::HistoricalPost;
use crate::learning::cohort::Cohorts;

pub const NEUTRAL_EFFECTIVENESS: u32 = 50;

/// Baseline presence rate used when the middle cohort is empty.
const EMPTY_BASELINE_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivenessScores {
    pub questions: u32,
    pub numbers: u32,
    pub bold_claims: u32,
    pub lists: u32,
    pub emojis: u32,
}

impl Default for EffectivenessScores {
    fn default() -> Self {
        Self {
            questions: NEUTRAL_EFFECTIVENESS,
            numbers: NEUTRAL_EFFECTIVENESS,
            bold_claims: NEUTRAL_EFFECTIVENESS,
            lists: NEUTRAL_EFFECTIVENESS,
            emojis: NEUTRAL_EFFECTIVENESS,
        }
    }
}

impl EffectivenessScores {
    pub fn get(&self, feature: Feature) -> u32 {
        match feature {
            Feature::Questions => self.questions,
            Feature::Numbers => self.numbers,
            Feature::BoldClaims => self.bold_claims,
            Feature::Lists => self.lists,
            Feature::Emojis => self.emojis,
        }
    }

    pub fn set(&mut self, feature: Feature, value: u32) {
        let slot = match feature {
            Feature::Questions => &mut self.questions,
            Feature::Numbers => &mut self.numbers,
            Feature::BoldClaims => &mut self.bold_claims,
            Feature::Lists => &mut self.lists,
            Feature::Emojis => &mut self.emojis,
        };
        *slot = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, u32)> + '_ {
        TRACKED_FEATURES
            .iter()
            .map(move |(feature, _)| (*feature, self.get(*feature)))
    }
}

pub fn estimate(cohorts: &Cohorts<'_>) -> EffectivenessScores {
    let mut scores = EffectivenessScores::default();
    for (feature, detector) in TRACKED_FEATURES {
        let top_rate = presence_rate(&cohorts.top, detector).unwrap_or(0.0);
        let mid_rate = presence_rate(&cohorts.middle, detector).unwrap_or(EMPTY_BASELINE_RATE);
        scores.set(feature, effectiveness(top_rate, mid_rate));
    }
    scores
}

/// Share of posts where the detector fires, or `None` for an empty cohort.
pub fn presence_rate(posts: &[&HistoricalPost], detector: Detector) -> Option<f64> {
    if posts.is_empty() {
        return None;
    }
    let hits = posts.iter().filter(|post| detector(&post.text)).count();
    Some(hits as f64 / posts.len() as f64)
}

pub fn effectiveness(top_rate: f64, mid_rate: f64) -> u32 {
    let ratio = if mid_rate > 0.0 {
        top_rate / mid_rate
    } else if top_rate > 0.0 {
        2.0
    } else {
        1.0
    };
    (50.0 * ratio).round().clamp(0.0, 100.0) as u32
}
