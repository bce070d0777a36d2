use crate::config::ScoringConfig;
use crate::features::{self, TextSignals};
use crate::{Factor, FactorResult};

pub const MIN_FACTOR_SCORE: i32 = 1;
pub const MAX_FACTOR_SCORE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBand {
    pub min: usize,
    pub max: usize,
}

impl LengthBand {
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn sweet_spot(config: &ScoringConfig) -> Self {
        Self::new(config.sweet_spot_min, config.sweet_spot_max)
    }
}

pub fn hook_strength(signals: &TextSignals) -> FactorResult {
    let line = signals.first_line.as_str();
    let line_len = line.chars().count();
    let question = features::has_question(line);
    let number = features::has_number(line);
    let bold = features::has_bold_claim(line);

    let mut score = 3;
    if question {
        score += 2;
    }
    if number {
        score += 2;
    }
    if bold {
        score += 2;
    }
    if (10..=100).contains(&line_len) {
        score += 1;
    } else if line_len > 150 {
        score -= 1;
    }
    let score = clamp_score(score);

    let feedback = if score >= 8 {
        "Strong opener: the first line gives readers a reason to stop scrolling.".to_string()
    } else if !question && !number && !bold {
        "Open with a question, a specific number, or a bold claim.".to_string()
    } else if line_len > 100 {
        "Tighten the first line; hooks land best under ~100 characters.".to_string()
    } else {
        "Decent hook; sharpen it with a more specific or surprising angle.".to_string()
    };

    factor(Factor::HookStrength, score, feedback)
}

pub fn reply_potential(signals: &TextSignals) -> FactorResult {
    let mut score = 2;
    if signals.has_question {
        score += 4;
    }
    if signals.reply_prompt {
        score += 2;
    }
    if signals.has_bold_claim {
        score += 1;
    }
    if signals.addresses_reader {
        score += 1;
    }
    let score = clamp_score(score);

    let feedback = if score >= 8 {
        "Readers have a clear prompt to reply.".to_string()
    } else if !signals.has_question {
        "Ask a direct question to invite replies.".to_string()
    } else {
        "Speak to the reader directly or ask for their take.".to_string()
    };

    factor(Factor::ReplyPotential, score, feedback)
}

/// Non-decreasing while the draft grows toward the band, 10 inside it.
pub fn length_optimization(char_count: usize, band: LengthBand) -> FactorResult {
    let score = length_score(char_count, band);
    let feedback = if char_count < band.min {
        format!(
            "Add context: {} characters, aim for {}-{}.",
            char_count, band.min, band.max
        )
    } else if char_count > band.max {
        format!(
            "Trim it down: {} characters, aim for {}-{}.",
            char_count, band.min, band.max
        )
    } else {
        format!("Length is in the {}-{} character sweet spot.", band.min, band.max)
    };

    factor(Factor::LengthOptimization, score, feedback)
}

pub fn length_score(char_count: usize, band: LengthBand) -> i32 {
    if char_count < band.min {
        let ratio = char_count as f64 / band.min.max(1) as f64;
        clamp_score((MAX_FACTOR_SCORE as f64 * ratio).round() as i32)
    } else if char_count <= band.max {
        MAX_FACTOR_SCORE
    } else {
        let over = (char_count - band.max) as f64;
        clamp_score(MAX_FACTOR_SCORE - (over / 30.0).ceil() as i32)
    }
}

pub fn readability(signals: &TextSignals) -> FactorResult {
    let words = signals.avg_words_per_sentence;
    let mut score = if words <= 15.0 {
        10
    } else if words <= 20.0 {
        8
    } else if words <= 25.0 {
        6
    } else {
        4
    };
    if signals.avg_word_len > 6.5 {
        score -= 2;
    }
    let wall_of_text = signals.char_count > 200 && signals.line_breaks == 0;
    if wall_of_text {
        score -= 2;
    }
    let score = clamp_score(score);

    let feedback = if wall_of_text {
        "Break it into short lines; walls of text get skipped.".to_string()
    } else if words > 20.0 {
        "Shorten your sentences for faster scanning.".to_string()
    } else if signals.avg_word_len > 6.5 {
        "Swap long words for simpler ones.".to_string()
    } else {
        "Easy to scan.".to_string()
    };

    factor(Factor::Readability, score, feedback)
}

pub fn engagement_triggers(signals: &TextSignals, config: &ScoringConfig) -> FactorResult {
    let mut score: i32 = 5;
    let mut notes: Vec<String> = Vec::new();

    if signals.hashtags > config.max_hashtags {
        score -= 2 * (signals.hashtags - config.max_hashtags) as i32;
        notes.push(format!("Use at most {} hashtags.", config.max_hashtags));
    } else if signals.hashtags > 0 {
        score += 1;
    }

    if (config.emoji_min..=config.emoji_max).contains(&signals.emojis) {
        score += 2;
    } else if signals.emojis > config.emoji_max {
        score -= (signals.emojis - config.emoji_max) as i32;
        notes.push(format!(
            "Cut back to {}-{} emojis.",
            config.emoji_min, config.emoji_max
        ));
    } else {
        notes.push(format!(
            "A well-placed emoji or two ({}-{}) can lift engagement.",
            config.emoji_min, config.emoji_max
        ));
    }

    if signals.has_list {
        score += 1;
    }
    if signals.cashtags > 2 {
        score -= 1;
        notes.push("Too many cashtags reads as spam.".to_string());
    }
    if signals.urls > 0 {
        score -= 1;
        notes.push("Links cut reach; move the link to a reply.".to_string());
    }
    let score = clamp_score(score);

    let feedback = if notes.is_empty() {
        "Good balance of hashtags, emojis and formatting.".to_string()
    } else {
        notes.join(" ")
    };

    factor(Factor::EngagementTriggers, score, feedback)
}

fn factor(name: Factor, score: i32, feedback: String) -> FactorResult {
    FactorResult {
        name,
        raw_score: score as u32,
        feedback,
    }
}

fn clamp_score(score: i32) -> i32 {
    score.clamp(MIN_FACTOR_SCORE, MAX_FACTOR_SCORE)
}
