use engagement_patterns::history::{FileHistorySource, HistorySource};

const HISTORY: &str = r#"[
    {"text": "Why do launches slip?", "like_count": 40, "reply_count": 3, "impressions": 0},
    {"text": "Shipped the new onboarding flow.", "like_count": 12},
    {"text": "Notes from week 3.", "like_count": 8, "retweet_count": 1, "impressions": 2400}
]"#;

#[tokio::test]
async fn missing_impressions_use_the_estimate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, HISTORY).unwrap();

    let source = FileHistorySource::new(path, 1000);
    let posts = source.fetch_recent("anyone", 100).await.unwrap();

    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].impressions, 1000);
    assert_eq!(posts[1].impressions, 1000);
    assert_eq!(posts[2].impressions, 2400);
    assert_eq!(posts[1].reply_count, 0);
    // (3 * 10 + 40) / 1000 * 100
    assert!((posts[0].engagement_rate() - 7.0).abs() < 1e-9);
}

#[tokio::test]
async fn limit_truncates_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, HISTORY).unwrap();

    let source = FileHistorySource::new(path, 500);
    let posts = source.fetch_recent("anyone", 2).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].text, "Shipped the new onboarding flow.");
    assert_eq!(posts[1].impressions, 500);
}

#[tokio::test]
async fn directory_is_keyed_by_user_id() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("alice.json"), HISTORY).unwrap();
    std::fs::write(
        dir.path().join("bob.json"),
        r#"[{"text": "Only one post here.", "like_count": 2}]"#,
    )
    .unwrap();

    let source = FileHistorySource::new(dir.path().to_path_buf(), 1000);
    assert_eq!(source.fetch_recent("alice", 100).await.unwrap().len(), 3);

    let bob = source.fetch_recent("bob", 100).await.unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].text, "Only one post here.");

    let err = source.fetch_recent("carol", 100).await.unwrap_err();
    assert!(err.contains("carol.json"));
}

#[tokio::test]
async fn malformed_history_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, "[{\"text\": ").unwrap();

    let source = FileHistorySource::new(path, 1000);
    let err = source.fetch_recent("anyone", 10).await.unwrap_err();
    assert!(err.starts_with("failed to parse history"));
}
