use serde::{Deserialize, Serialize};

use crate::learning::effectiveness::EffectivenessScores;

pub const WEIGHT_TOTAL: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightVector {
    pub hook: u32,
    pub reply_potential: u32,
    pub length: u32,
    pub readability: u32,
    pub hashtags: u32,
    pub emojis: u32,
}

/// Priors shared by the weight synthesizer and cold-start scoring.
pub const DEFAULT_WEIGHTS: WeightVector = WeightVector {
    hook: 25,
    reply_potential: 30,
    length: 15,
    readability: 10,
    hashtags: 10,
    emojis: 10,
};

impl Default for WeightVector {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl WeightVector {
    pub fn total(&self) -> u32 {
        self.to_array().iter().sum()
    }

    pub fn is_normalized(&self) -> bool {
        self.total() == WEIGHT_TOTAL
    }

    fn to_array(self) -> [u32; 6] {
        [
            self.hook,
            self.reply_potential,
            self.length,
            self.readability,
            self.hashtags,
            self.emojis,
        ]
    }

    fn from_array(values: [u32; 6]) -> Self {
        Self {
            hook: values[0],
            reply_potential: values[1],
            length: values[2],
            readability: values[3],
            hashtags: values[4],
            emojis: values[5],
        }
    }
}

/// Adjusts the priors by feature effectiveness, then rescales so the six
/// weights sum to exactly 100.
pub fn synthesize(effectiveness: &EffectivenessScores) -> WeightVector {
    let hook_signal = effectiveness
        .questions
        .max(effectiveness.numbers)
        .max(effectiveness.bold_claims);

    let adjusted = WeightVector {
        hook: scale_prior(DEFAULT_WEIGHTS.hook, hook_signal),
        reply_potential: scale_prior(DEFAULT_WEIGHTS.reply_potential, effectiveness.questions),
        emojis: scale_prior(DEFAULT_WEIGHTS.emojis, effectiveness.emojis),
        ..DEFAULT_WEIGHTS
    };

    rescale(adjusted)
}

fn scale_prior(prior: u32, effectiveness: u32) -> u32 {
    (prior as f64 * effectiveness as f64 / 50.0).round() as u32
}

/// One rescale-and-round pass; rounding drift lands on the largest weight.
pub fn rescale(weights: WeightVector) -> WeightVector {
    let raw = weights.to_array();
    let sum: u32 = raw.iter().sum();
    if sum == 0 {
        return DEFAULT_WEIGHTS;
    }

    let factor = WEIGHT_TOTAL as f64 / sum as f64;
    let mut scaled = raw.map(|value| (value as f64 * factor).round() as u32);

    let drift = WEIGHT_TOTAL as i64 - scaled.iter().map(|v| *v as i64).sum::<i64>();
    if drift != 0 {
        let mut largest = 0usize;
        for (idx, value) in scaled.iter().enumerate() {
            if *value > scaled[largest] {
                largest = idx;
            }
        }
        scaled[largest] = (scaled[largest] as i64 + drift).max(0) as u32;
    }

    WeightVector::from_array(scaled)
}
