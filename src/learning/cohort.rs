use std::cmp::Ordering;

use crate::config::LearningConfig;
use crate::history::HistoricalPost;

#[derive(Debug, Clone)]
pub struct Cohorts<'a> {
    pub top: Vec<&'a HistoricalPost>,
    pub middle: Vec<&'a HistoricalPost>,
}

/// Sorts descending by engagement rate. Ties keep their input order.
pub fn rank_by_engagement(posts: &[HistoricalPost]) -> Vec<&HistoricalPost> {
    let mut ranked: Vec<&HistoricalPost> = posts.iter().collect();
    ranked.sort_by(|a, b| {
        b.engagement_rate()
            .partial_cmp(&a.engagement_rate())
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

pub fn partition<'a>(ranked: &[&'a HistoricalPost], config: &LearningConfig) -> Cohorts<'a> {
    let n = ranked.len();
    let top_len = config
        .top_floor
        .max(fraction_ceil(n, config.top_fraction))
        .min(n);

    let middle_start = fraction_floor(n, config.middle_start).min(n);
    let middle_end = fraction_floor(n, config.middle_end).clamp(middle_start, n);

    Cohorts {
        top: ranked[..top_len].to_vec(),
        middle: ranked[middle_start..middle_end].to_vec(),
    }
}

// The epsilon keeps products like 0.2 * 35 from landing one slot off.
fn fraction_ceil(n: usize, fraction: f64) -> usize {
    (fraction * n as f64 - 1e-9).ceil().max(0.0) as usize
}

fn fraction_floor(n: usize, fraction: f64) -> usize {
    (fraction * n as f64 + 1e-9).floor().max(0.0) as usize
}
