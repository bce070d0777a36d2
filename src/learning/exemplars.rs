use crate::features::{first_line, last_line, non_empty_line_count};
use crate::history::HistoricalPost;

pub const LENGTH_FLOOR: usize = 50;
pub const LENGTH_CEILING: usize = 500;

const MIN_HOOK_CHARS: usize = 10;

const CTA_PHRASES: [&str; 16] = [
    "follow",
    "reply",
    "comment",
    "share",
    "retweet",
    "repost",
    "bookmark",
    "subscribe",
    "let me know",
    "drop",
    "thoughts",
    "agree",
    "what do you think",
    "dm me",
    "link in",
    "check out",
];

/// 25th-75th percentile band of top-cohort lengths, clamped to [50, 500].
pub fn optimal_length_band(top: &[&HistoricalPost]) -> (usize, usize) {
    let mut lengths: Vec<usize> = top.iter().map(|post| post.text.chars().count()).collect();
    if lengths.is_empty() {
        return (LENGTH_FLOOR, LENGTH_CEILING);
    }
    lengths.sort_unstable();

    let low = nearest_rank(&lengths, 0.25).clamp(LENGTH_FLOOR, LENGTH_CEILING);
    let high = nearest_rank(&lengths, 0.75).clamp(LENGTH_FLOOR, LENGTH_CEILING);
    (low, high.max(low))
}

fn nearest_rank(sorted: &[usize], percentile: f64) -> usize {
    let rank = (percentile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

pub fn top_hooks(top: &[&HistoricalPost], limit: usize) -> Vec<String> {
    let mut hooks: Vec<String> = Vec::new();
    for post in top {
        if hooks.len() >= limit {
            break;
        }
        let hook = first_line(&post.text);
        if hook.chars().count() > MIN_HOOK_CHARS && !hooks.iter().any(|seen| seen == hook) {
            hooks.push(hook.to_string());
        }
    }
    hooks
}

pub fn top_ctas(top: &[&HistoricalPost], limit: usize) -> Vec<String> {
    let mut ctas: Vec<String> = Vec::new();
    for post in top {
        if ctas.len() >= limit {
            break;
        }
        if non_empty_line_count(&post.text) < 2 {
            continue;
        }
        let line = last_line(&post.text);
        if is_call_to_action(line) && !ctas.iter().any(|seen| seen == line) {
            ctas.push(line.to_string());
        }
    }
    ctas
}

pub fn is_call_to_action(line: &str) -> bool {
    let lowercase = line.to_lowercase();
    line.trim_end().ends_with('?') || CTA_PHRASES.iter().any(|phrase| lowercase.contains(phrase))
}
