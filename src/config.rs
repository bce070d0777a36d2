use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub min_history: usize,
    pub history_limit: usize,
    pub impression_estimate: u64,
    pub fetch_retry_backoff_ms: u64,
    pub top_fraction: f64,
    pub top_floor: usize,
    pub middle_start: f64,
    pub middle_end: f64,
    pub max_exemplars: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_history: 10,
            history_limit: 100,
            impression_estimate: 1000,
            fetch_retry_backoff_ms: 500,
            top_fraction: 0.2,
            top_floor: 10,
            middle_start: 0.3,
            middle_end: 0.7,
            max_exemplars: 5,
        }
    }
}

impl LearningConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.fetch_retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub min_sample_size: usize,
    pub sweet_spot_min: usize,
    pub sweet_spot_max: usize,
    pub max_hashtags: usize,
    pub emoji_min: usize,
    pub emoji_max: usize,
    pub degenerate_min_chars: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_sample_size: 10,
            sweet_spot_min: 180,
            sweet_spot_max: 280,
            max_hashtags: 2,
            emoji_min: 1,
            emoji_max: 2,
            degenerate_min_chars: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/profiles.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    pub timeout_ms: u64,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self { timeout_ms: 8000 }
    }
}

impl AugmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub learning: LearningConfig,
    pub scoring: ScoringConfig,
    pub store: StoreConfig,
    pub augment: AugmentConfig,
}

impl EngineConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                EngineConfig::default()
            }
        } else {
            EngineConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("PROFILE_STORE_PATH") {
            if !path.trim().is_empty() {
                self.store.path = PathBuf::from(path);
            }
        }
        if let Ok(limit) = env::var("HISTORY_LIMIT") {
            if let Ok(value) = limit.parse::<usize>() {
                self.learning.history_limit = value;
            }
        }
        if let Ok(estimate) = env::var("IMPRESSION_ESTIMATE") {
            if let Ok(value) = estimate.parse::<u64>() {
                self.learning.impression_estimate = value;
            }
        }
        if let Ok(backoff) = env::var("FETCH_RETRY_BACKOFF_MS") {
            if let Ok(value) = backoff.parse::<u64>() {
                self.learning.fetch_retry_backoff_ms = value;
            }
        }
        if let Ok(timeout) = env::var("AUGMENT_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.augment.timeout_ms = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("ENGINE_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/engine.toml")))
}
