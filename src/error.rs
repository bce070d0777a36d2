use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("insufficient history: need {} more posts (found {found})", missing_posts(.found, .required))]
    InsufficientHistory { found: usize, required: usize },

    #[error("history source unreachable: {0}")]
    UpstreamFetchFailed(String),

    #[error("profile store unavailable: {0}")]
    StoreUnavailable(String),
}

impl EngineError {
    /// Stable code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InsufficientHistory { .. } => "insufficient_history",
            EngineError::UpstreamFetchFailed(_) => "upstream_fetch_failed",
            EngineError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

fn missing_posts(found: &usize, required: &usize) -> usize {
    required.saturating_sub(*found)
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AugmentError {
    #[error("qualitative feedback not configured")]
    NotConfigured,

    #[error("draft too short for qualitative feedback")]
    DraftTooShort,

    #[error("qualitative feedback timed out after {0}ms")]
    Timeout(u64),

    #[error("qualitative feedback failed: {0}")]
    Failed(String),
}
