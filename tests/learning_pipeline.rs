use chrono::{DateTime, TimeZone, Utc};
use engagement_patterns::config::LearningConfig;
use engagement_patterns::history::HistoricalPost;
use engagement_patterns::learning::{
    analyze_history, build_insights, effectiveness, estimate, partition, rank_by_engagement,
    rescale, synthesize, top_ctas, Cohorts, EffectivenessScores, WeightVector, DEFAULT_WEIGHTS,
};
use engagement_patterns::EngineError;

const NEUTRAL: [&str; 12] = [
    "Shipping small changes keeps the team calm and focused.",
    "Good documentation saves hours of onboarding later.",
    "Writing tests first made our releases boring in the best way.",
    "Pair programming taught me more than any course.",
    "Refactoring old code feels slow until it suddenly pays off.",
    "Clear naming beats clever abstractions almost every time.",
    "Customer calls changed how our roadmap looks.",
    "Quiet mornings are where deep work happens for me.",
    "Small teams move faster when decisions are written down.",
    "Logging the right things turned our incidents into quick fixes.",
    "Simple pricing pages convert better than fancy ones.",
    "Reading source code is an underrated way to learn.",
];

fn post(text: &str, likes: u64) -> HistoricalPost {
    HistoricalPost::new(text, likes, 0, 0, 1000)
}

fn analyzed_at() -> DateTime<Utc> {
    Utc.timestamp_opt(1_760_000_000, 0).unwrap()
}

/// Ten posts, ranked by index, where only the two best performers ask a question.
fn history_with_top_questions() -> Vec<HistoricalPost> {
    let mut posts = vec![
        post("What is the one habit that made you a better engineer?", 200),
        post("Why do most launches slip past the deadline?", 190),
    ];
    for (idx, text) in NEUTRAL.iter().take(8).enumerate() {
        posts.push(post(text, 100 - idx as u64 * 10));
    }
    posts
}

fn neutral_history(count: usize) -> Vec<HistoricalPost> {
    (0..count)
        .map(|idx| post(NEUTRAL[idx % NEUTRAL.len()], 50 + idx as u64))
        .collect()
}

#[test]
fn engagement_rate_weights_replies_and_retweets() {
    let post = HistoricalPost::new("text", 10, 2, 1, 1000);
    // (1 * 10 + 2 * 5 + 10) / 1000 * 100
    assert!((post.engagement_rate() - 3.0).abs() < 1e-9);

    let no_impressions = HistoricalPost::new("text", 1, 0, 0, 0);
    assert!((no_impressions.engagement_rate() - 100.0).abs() < 1e-9);
}

#[test]
fn nine_posts_is_insufficient_history() {
    let config = LearningConfig::default();
    let result = analyze_history("user", &neutral_history(9), &config, analyzed_at());
    assert_eq!(
        result.unwrap_err(),
        EngineError::InsufficientHistory {
            found: 9,
            required: 10
        }
    );
}

#[test]
fn ten_posts_is_enough_history() {
    let config = LearningConfig::default();
    let profile = analyze_history("user", &neutral_history(10), &config, analyzed_at()).unwrap();
    assert_eq!(profile.sample_size, 10);
    assert_eq!(profile.user_id, "user");
}

#[test]
fn blank_posts_do_not_count_toward_history() {
    let config = LearningConfig::default();
    let mut posts = neutral_history(9);
    posts.push(post("   ", 500));

    let err = analyze_history("user", &posts, &config, analyzed_at()).unwrap_err();
    assert_eq!(err.to_string(), "insufficient history: need 1 more posts (found 9)");
}

#[test]
fn questions_only_in_top_performers_score_full_effectiveness() {
    let config = LearningConfig::default();
    let profile =
        analyze_history("user", &history_with_top_questions(), &config, analyzed_at()).unwrap();

    assert_eq!(profile.effectiveness.questions, 100);
    assert_eq!(profile.effectiveness.numbers, 50);
    assert_eq!(profile.effectiveness.bold_claims, 50);
    assert_eq!(profile.effectiveness.lists, 50);
    assert_eq!(profile.effectiveness.emojis, 50);
}

#[test]
fn synthesized_weights_follow_effectiveness_and_sum_to_100() {
    let config = LearningConfig::default();
    let profile =
        analyze_history("user", &history_with_top_questions(), &config, analyzed_at()).unwrap();

    assert_eq!(
        profile.weights,
        WeightVector {
            hook: 32,
            reply_potential: 40,
            length: 10,
            readability: 6,
            hashtags: 6,
            emojis: 6,
        }
    );
    assert_eq!(profile.weights.total(), 100);
}

#[test]
fn neutral_effectiveness_keeps_prior_weights() {
    let weights = synthesize(&EffectivenessScores::default());
    assert_eq!(weights, DEFAULT_WEIGHTS);
}

#[test]
fn zero_effectiveness_still_sums_to_100() {
    let scores = EffectivenessScores {
        questions: 0,
        numbers: 0,
        bold_claims: 0,
        lists: 0,
        emojis: 0,
    };
    let weights = synthesize(&scores);
    assert_eq!(weights.hook, 0);
    assert_eq!(weights.reply_potential, 0);
    assert_eq!(weights.emojis, 0);
    assert_eq!(weights.total(), 100);
}

#[test]
fn rescale_absorbs_rounding_drift_in_largest_weight() {
    let weights = rescale(WeightVector {
        hook: 1,
        reply_potential: 1,
        length: 1,
        readability: 0,
        hashtags: 0,
        emojis: 0,
    });
    assert_eq!(
        weights,
        WeightVector {
            hook: 34,
            reply_potential: 33,
            length: 33,
            readability: 0,
            hashtags: 0,
            emojis: 0,
        }
    );
}

#[test]
fn effectiveness_ratio_edge_cases() {
    assert_eq!(effectiveness(0.0, 0.0), 50);
    assert_eq!(effectiveness(0.5, 0.0), 100);
    assert_eq!(effectiveness(0.4, 0.1), 100);
    assert_eq!(effectiveness(0.0, 0.4), 0);
    assert_eq!(effectiveness(0.3, 0.6), 25);
}

#[test]
fn empty_middle_cohort_uses_neutral_baseline() {
    let question = post("Why does this keep happening?", 10);
    let plain = post(NEUTRAL[0], 5);
    let cohorts = Cohorts {
        top: vec![&question, &plain],
        middle: Vec::new(),
    };

    let scores = estimate(&cohorts);
    // top rate 0.5 against the 0.5 fallback
    assert_eq!(scores.questions, 50);
    // absent from top, 0.0 against 0.5
    assert_eq!(scores.numbers, 0);
}

#[test]
fn cohorts_follow_percentile_slices() {
    let config = LearningConfig::default();

    let small = neutral_history(10);
    let ranked = rank_by_engagement(&small);
    let cohorts = partition(&ranked, &config);
    assert_eq!(cohorts.top.len(), 10);
    assert_eq!(cohorts.middle.len(), 4);

    let large = neutral_history(60);
    let ranked = rank_by_engagement(&large);
    let cohorts = partition(&ranked, &config);
    assert_eq!(cohorts.top.len(), 12);
    assert_eq!(cohorts.middle.len(), 24);
    assert_eq!(cohorts.middle[0].engagement_rate(), ranked[18].engagement_rate());
}

#[test]
fn ranking_is_descending_by_engagement() {
    let posts = vec![post("low", 1), post("high", 90), post("mid", 40)];
    let ranked = rank_by_engagement(&posts);
    let order: Vec<&str> = ranked.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(order, vec!["high", "mid", "low"]);
}

#[test]
fn learning_is_reproducible_for_identical_history() {
    let config = LearningConfig::default();
    let posts = history_with_top_questions();

    let first = analyze_history("user", &posts, &config, analyzed_at()).unwrap();
    let second = analyze_history("user", &posts, &config, analyzed_at()).unwrap();

    assert_eq!(first.weights, second.weights);
    assert_eq!(first.effectiveness, second.effectiveness);
    assert_eq!(first, second);
}

#[test]
fn invariants_hold_across_varied_histories() {
    let templates = [
        "Why is onboarding so hard for new hires?",
        "5 ways to make code review faster",
        "Unpopular opinion: standups are useful",
        "Checklist:\n- write it down\n- ship it",
        "Launch day went well 🚀",
        NEUTRAL[3],
    ];
    let config = LearningConfig::default();

    for k in 0..25u64 {
        let n = 10 + k as usize * 3;
        let posts: Vec<HistoricalPost> = (0..n)
            .map(|i| {
                let text = templates[(i * (k as usize + 1) + k as usize) % templates.len()];
                post(text, (i as u64 * 37 + k * 11) % 97)
            })
            .collect();

        let profile = analyze_history("user", &posts, &config, analyzed_at()).unwrap();
        assert_eq!(profile.weights.total(), 100, "history variant {}", k);
        for (_, score) in profile.effectiveness.iter() {
            assert!(score <= 100);
        }
        assert!(profile.optimal_length_min >= 50);
        assert!(profile.optimal_length_max <= 500);
        assert!(profile.optimal_length_min <= profile.optimal_length_max);
        assert!(profile.top_hooks.len() <= 5);
        assert!(profile.top_ctas.len() <= 5);
    }
}

#[test]
fn optimal_length_band_uses_top_cohort_quartiles() {
    let config = LearningConfig::default();
    let profile =
        analyze_history("user", &history_with_top_questions(), &config, analyzed_at()).unwrap();
    assert_eq!(profile.optimal_length_min, 50);
    assert_eq!(profile.optimal_length_max, 57);
}

#[test]
fn top_hooks_are_first_lines_of_best_posts() {
    let config = LearningConfig::default();
    let profile =
        analyze_history("user", &history_with_top_questions(), &config, analyzed_at()).unwrap();

    assert_eq!(profile.top_hooks.len(), 5);
    assert_eq!(
        profile.top_hooks[0],
        "What is the one habit that made you a better engineer?"
    );
    assert!(profile.top_ctas.is_empty());
}

#[test]
fn top_ctas_come_from_closing_lines() {
    let first = post("Shipped the new onboarding flow.\nWhat do you think?", 90);
    let second = post("Wrote up our incident process.\nFollow for more notes like this.", 80);
    let repeat = post("Another small release today.\nWhat do you think?", 70);
    let no_cta = post("Cleaned up the backlog.\nFeels good.", 60);
    let single = post("Tell me your favourite editor", 50);

    let top = vec![&first, &second, &repeat, &no_cta, &single];
    let ctas = top_ctas(&top, 5);
    assert_eq!(
        ctas,
        vec![
            "What do you think?".to_string(),
            "Follow for more notes like this.".to_string()
        ]
    );
}

#[test]
fn insights_describe_strong_features() {
    let config = LearningConfig::default();
    let profile =
        analyze_history("user", &history_with_top_questions(), &config, analyzed_at()).unwrap();
    let insights = build_insights(&profile);

    assert_eq!(insights.what_works.len(), 1);
    assert!(insights.what_works[0].starts_with("Questions"));
    assert_eq!(insights.optimal_length, "50-57 characters");
    assert_eq!(insights.top_hooks.len(), 3);
    assert!(insights.summary.contains("10 posts"));
}
