use async_trait::async_trait;
use engagement_patterns::history::{HistoricalPost, HistorySource};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::http::check_status;

const MAX_PAGE_SIZE: usize = 100;
const MIN_PAGE_SIZE: usize = 5;

#[derive(Clone)]
pub struct XApiClient {
    client: reqwest::Client,
    api_base: String,
    auth: XApiAuth,
    impression_estimate: u64,
}

#[derive(Clone)]
enum XApiAuth {
    Bearer(String),
    OAuthClientCredentials {
        client_id: String,
        client_secret: String,
        token_url: String,
        scope: Option<String>,
        auth_mode: OAuthAuthMode,
        client_type: Option<String>,
        token_cache: Arc<Mutex<Option<OAuthTokenCache>>>,
    },
}

#[derive(Clone)]
struct OAuthTokenCache {
    access_token: String,
    expires_at: Instant,
}

#[derive(Clone, Copy)]
enum OAuthAuthMode {
    Basic,
    Body,
}

impl XApiClient {
    pub fn from_env(impression_estimate: u64) -> Option<Self> {
        let api_base = env::var("X_API_BASE").unwrap_or_else(|_| "https://api.twitter.com/2".to_string());
        let client = reqwest::Client::new();

        if let Ok(bearer_token) = env::var("X_API_BEARER_TOKEN") {
            return Some(Self {
                client,
                api_base,
                auth: XApiAuth::Bearer(decode_bearer(bearer_token)),
                impression_estimate,
            });
        }

        if let (Ok(client_id), Ok(client_secret)) = (
            env::var("X_OAUTH_CLIENT_ID"),
            env::var("X_OAUTH_CLIENT_SECRET"),
        ) {
            let token_url = env::var("X_OAUTH_TOKEN_URL")
                .unwrap_or_else(|_| "https://api.twitter.com/2/oauth2/token".to_string());
            let scope = env::var("X_OAUTH_SCOPE").ok().filter(|value| !value.trim().is_empty());
            let auth_mode = match env::var("X_OAUTH_AUTH_MODE")
                .unwrap_or_else(|_| "basic".to_string())
                .to_lowercase()
                .as_str()
            {
                "basic" => OAuthAuthMode::Basic,
                _ => OAuthAuthMode::Body,
            };
            let client_type = env::var("X_OAUTH_CLIENT_TYPE")
                .ok()
                .filter(|value| !value.trim().is_empty());
            return Some(Self {
                client,
                api_base,
                auth: XApiAuth::OAuthClientCredentials {
                    client_id,
                    client_secret,
                    token_url,
                    scope,
                    auth_mode,
                    client_type,
                    token_cache: Arc::new(Mutex::new(None)),
                },
                impression_estimate,
            });
        }

        None
    }

    pub async fn fetch_user_by_username(&self, username: &str) -> Result<XUserProfile, String> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .get(format!(
                "{}/users/by/username/{}",
                self.api_base.trim_end_matches('/'),
                username.trim_start_matches('@')
            ))
            .query(&[("user.fields", "public_metrics")])
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|err| format!("X API request failed: {}", err))?;
        let response = check_status(response, "X API error").await?;

        let body: XUserResponse = response
            .json()
            .await
            .map_err(|err| format!("X API response parse failed: {}", err))?;

        let user = body
            .data
            .ok_or_else(|| "X API response missing user data".to_string())?;

        Ok(XUserProfile::from(user))
    }

    /// Most recent original posts, newest first. Replies and retweets are
    /// excluded upstream.
    pub async fn fetch_user_posts(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoricalPost>, String> {
        let token = self.bearer_token().await?;
        let url = format!(
            "{}/users/{}/tweets",
            self.api_base.trim_end_matches('/'),
            user_id
        );

        let mut posts = Vec::new();
        let mut pagination_token: Option<String> = None;
        while posts.len() < limit {
            let page_size = (limit - posts.len()).clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
            let mut query = vec![
                ("exclude", "replies,retweets".to_string()),
                ("tweet.fields", "public_metrics".to_string()),
                ("max_results", page_size.to_string()),
            ];
            if let Some(token) = pagination_token.as_ref() {
                query.push(("pagination_token", token.clone()));
            }

            let response = self
                .client
                .get(&url)
                .query(&query)
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .send()
                .await
                .map_err(|err| format!("X API request failed: {}", err))?;
            let response = check_status(response, "X API error").await?;

            let body: XTweetsResponse = response
                .json()
                .await
                .map_err(|err| format!("X API response parse failed: {}", err))?;

            let page = body.data.unwrap_or_default();
            if page.is_empty() {
                break;
            }
            for tweet in page {
                posts.push(tweet.into_post(self.impression_estimate));
            }

            pagination_token = body.meta.and_then(|meta| meta.next_token);
            if pagination_token.is_none() {
                break;
            }
        }

        posts.truncate(limit);
        tracing::debug!(user_id, fetched = posts.len(), "fetched post history");
        Ok(posts)
    }

    async fn bearer_token(&self) -> Result<String, String> {
        match &self.auth {
            XApiAuth::Bearer(token) => Ok(token.clone()),
            XApiAuth::OAuthClientCredentials {
                client_id,
                client_secret,
                token_url,
                scope,
                auth_mode,
                client_type,
                token_cache,
            } => {
                let now = Instant::now();
                {
                    let guard = token_cache.lock().await;
                    if let Some(cache) = guard.as_ref() {
                        if now < cache.expires_at {
                            return Ok(cache.access_token.clone());
                        }
                    }
                }

                let token = self
                    .fetch_oauth_token(
                        client_id,
                        client_secret,
                        token_url,
                        scope.as_deref(),
                        *auth_mode,
                        client_type.as_deref(),
                    )
                    .await?;
                let mut guard = token_cache.lock().await;
                *guard = Some(token.clone());
                Ok(token.access_token)
            }
        }
    }

    async fn fetch_oauth_token(
        &self,
        client_id: &str,
        client_secret: &str,
        token_url: &str,
        scope: Option<&str>,
        auth_mode: OAuthAuthMode,
        client_type: Option<&str>,
    ) -> Result<OAuthTokenCache, String> {
        let mut params = vec![("grant_type".to_string(), "client_credentials".to_string())];
        params.push(("client_id".to_string(), client_id.to_string()));
        params.push(("client_secret".to_string(), client_secret.to_string()));
        if let Some(value) = client_type {
            params.push(("client_type".to_string(), value.to_string()));
        }
        if let Some(scope_value) = scope {
            params.push(("scope".to_string(), scope_value.to_string()));
        }

        let mut request = self.client.post(token_url);
        if matches!(auth_mode, OAuthAuthMode::Basic) {
            request = request.basic_auth(client_id, Some(client_secret));
        }

        let response = request
            .form(&params)
            .send()
            .await
            .map_err(|err| format!("X OAuth token request failed: {}", err))?;
        let response = check_status(response, "X OAuth token error").await?;

        let body: OAuthTokenResponse = response
            .json()
            .await
            .map_err(|err| format!("X OAuth token parse failed: {}", err))?;

        let expires_in = body.expires_in.unwrap_or(3600);
        let expires_at = Instant::now() + Duration::from_secs(expires_in.saturating_sub(30));
        Ok(OAuthTokenCache {
            access_token: body.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl HistorySource for XApiClient {
    async fn fetch_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoricalPost>, String> {
        self.fetch_user_posts(user_id, limit).await
    }
}

fn decode_bearer(value: String) -> String {
    if value.contains('%') {
        match urlencoding::decode(&value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value,
        }
    } else {
        value
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct XUserProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub followers: u64,
}

impl From<XUser> for XUserProfile {
    fn from(user: XUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            followers: user
                .public_metrics
                .as_ref()
                .map(|metrics| metrics.followers_count)
                .unwrap_or(0),
        }
    }
}

#[derive(Deserialize)]
struct XUserResponse {
    data: Option<XUser>,
}

#[derive(Deserialize)]
struct XUser {
    id: String,
    username: String,
    name: String,
    public_metrics: Option<XUserMetrics>,
}

#[derive(Deserialize)]
struct XUserMetrics {
    followers_count: u64,
}

#[derive(Deserialize)]
struct XTweetsResponse {
    data: Option<Vec<XTweet>>,
    meta: Option<XTweetsMeta>,
}

#[derive(Deserialize)]
struct XTweetsMeta {
    next_token: Option<String>,
}

#[derive(Deserialize)]
struct XTweet {
    text: String,
    public_metrics: Option<XTweetMetrics>,
}

#[derive(Deserialize, Default)]
struct XTweetMetrics {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    impression_count: Option<u64>,
}

impl XTweet {
    fn into_post(self, impression_estimate: u64) -> HistoricalPost {
        let metrics = self.public_metrics.unwrap_or_default();
        // Impressions are not always reported; a flat estimate stands in.
        let impressions = metrics
            .impression_count
            .filter(|count| *count > 0)
            .unwrap_or(impression_estimate);
        HistoricalPost::new(
            self.text,
            metrics.like_count,
            metrics.retweet_count,
            metrics.reply_count,
            impressions,
        )
    }
}

#[derive(Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tweets(json: &str) -> Vec<HistoricalPost> {
        let response: XTweetsResponse = serde_json::from_str(json).unwrap();
        response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|tweet| tweet.into_post(1000))
            .collect()
    }

    #[test]
    fn missing_or_zero_impressions_use_the_estimate() {
        let posts = tweets(
            r#"{"data": [
                {"text": "a", "public_metrics": {"like_count": 5, "impression_count": 0}},
                {"text": "b", "public_metrics": {"like_count": 2, "reply_count": 1}},
                {"text": "c"},
                {"text": "d", "public_metrics": {"like_count": 9, "impression_count": 4200}}
            ]}"#,
        );

        let impressions: Vec<u64> = posts.iter().map(|post| post.impressions).collect();
        assert_eq!(impressions, vec![1000, 1000, 1000, 4200]);
        assert_eq!(posts[1].reply_count, 1);
        assert_eq!(posts[2].like_count, 0);
    }
}
