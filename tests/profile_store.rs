use chrono::{DateTime, Duration, TimeZone, Utc};
use engagement_patterns::learning::EffectivenessScores;
use engagement_patterns::profile::{JsonProfileStore, ProfileStore};
use engagement_patterns::{LearnedProfile, DEFAULT_WEIGHTS};

fn analyzed_at() -> DateTime<Utc> {
    Utc.timestamp_opt(1_760_000_000, 0).unwrap()
}

fn profile(user_id: &str, sample_size: usize, at: DateTime<Utc>) -> LearnedProfile {
    LearnedProfile {
        user_id: user_id.to_string(),
        optimal_length_min: 80,
        optimal_length_max: 160,
        effectiveness: EffectivenessScores::default(),
        weights: DEFAULT_WEIGHTS,
        top_hooks: vec!["What would you cut first?".to_string()],
        top_ctas: Vec::new(),
        sample_size,
        avg_engagement_rate: 1.25,
        last_analyzed_at: at,
    }
}

#[tokio::test]
async fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonProfileStore::load(dir.path().join("profiles.json"))
        .await
        .unwrap();

    assert!(store.get("nobody").await.unwrap().is_none());
    assert!(store.list().await.is_empty());
}

#[tokio::test]
async fn upsert_persists_across_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("profiles.json");

    let store = JsonProfileStore::load(path.clone()).await.unwrap();
    let saved = profile("alice", 20, analyzed_at());
    store.upsert(saved.clone()).await.unwrap();

    let reloaded = JsonProfileStore::load(path.clone()).await.unwrap();
    assert_eq!(reloaded.get("alice").await.unwrap(), Some(saved));
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn newer_snapshot_replaces_the_whole_profile() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonProfileStore::load(dir.path().join("profiles.json"))
        .await
        .unwrap();

    store.upsert(profile("alice", 20, analyzed_at())).await.unwrap();
    let mut next = profile("alice", 35, analyzed_at() + Duration::hours(1));
    next.top_hooks.clear();
    store.upsert(next.clone()).await.unwrap();

    assert_eq!(store.get("alice").await.unwrap(), Some(next));
    assert_eq!(store.list().await.len(), 1);
}

#[tokio::test]
async fn older_snapshot_never_overwrites_newer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.json");
    let store = JsonProfileStore::load(path.clone()).await.unwrap();

    let newer = profile("alice", 40, analyzed_at());
    store.upsert(newer.clone()).await.unwrap();
    let returned = store
        .upsert(profile("alice", 12, analyzed_at() - Duration::minutes(5)))
        .await
        .unwrap();

    assert_eq!(returned, newer);
    assert_eq!(store.get("alice").await.unwrap(), Some(newer.clone()));

    let reloaded = JsonProfileStore::load(path).await.unwrap();
    assert_eq!(reloaded.get("alice").await.unwrap(), Some(newer));
}

#[tokio::test]
async fn profiles_are_keyed_by_user() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonProfileStore::load(dir.path().join("profiles.json"))
        .await
        .unwrap();

    store.upsert(profile("alice", 20, analyzed_at())).await.unwrap();
    store.upsert(profile("bob", 15, analyzed_at())).await.unwrap();

    assert_eq!(store.get("alice").await.unwrap().unwrap().sample_size, 20);
    assert_eq!(store.get("bob").await.unwrap().unwrap().sample_size, 15);
    assert_eq!(store.list().await.len(), 2);
}

#[tokio::test]
async fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = JsonProfileStore::load(path).await;
    assert!(result.is_err());
}
