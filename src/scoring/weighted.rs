use crate::learning::WeightVector;
use crate::{Factor, FactorResult};

/// Per-factor weights on the 1-10 factor scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorWeights {
    pub hook: f64,
    pub reply_potential: f64,
    pub length: f64,
    pub readability: f64,
    pub engagement_triggers: f64,
}

impl From<&WeightVector> for FactorWeights {
    fn from(weights: &WeightVector) -> Self {
        Self {
            hook: weights.hook as f64 / 10.0,
            reply_potential: weights.reply_potential as f64 / 10.0,
            length: weights.length as f64 / 10.0,
            readability: weights.readability as f64 / 10.0,
            engagement_triggers: (weights.hashtags + weights.emojis) as f64 / 10.0,
        }
    }
}

impl FactorWeights {
    pub fn weight(&self, factor: Factor) -> f64 {
        match factor {
            Factor::HookStrength => self.hook,
            Factor::ReplyPotential => self.reply_potential,
            Factor::LengthOptimization => self.length,
            Factor::Readability => self.readability,
            Factor::EngagementTriggers => self.engagement_triggers,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeightedScorer {
    weights: FactorWeights,
}

impl WeightedScorer {
    pub fn new(weights: FactorWeights) -> Self {
        Self { weights }
    }

    /// Weighted mean of the factor scores mapped onto 1-100.
    pub fn score(&self, factors: &[FactorResult]) -> u32 {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for result in factors {
            let weight = self.weights.weight(result.name);
            weighted += result.raw_score as f64 * weight;
            total_weight += weight;
        }

        if total_weight <= 0.0 {
            return 1;
        }

        (weighted / total_weight * 10.0).round().clamp(1.0, 100.0) as u32
    }
}
