use async_trait::async_trait;
use engagement_patterns::augment::{
    parse_feedback, AugmentRequest, QualitativeAugmenter, QualitativeFeedback,
};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::http::check_status;

#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl LlmClient {
    pub fn from_env(model_override: Option<String>, timeout: Duration) -> Option<Self> {
        let api_key = env::var("XAI_API_KEY").ok()?;
        let api_base = env::var("XAI_API_BASE").unwrap_or_else(|_| "https://api.x.ai/v1".to_string());
        let model = model_override
            .or_else(|| env::var("XAI_MODEL").ok())
            .unwrap_or_else(|| "grok-2-latest".to_string());
        let client = reqwest::Client::builder().timeout(timeout).build().ok()?;
        Some(Self {
            client,
            api_key,
            api_base,
            model,
        })
    }

    pub async fn review_draft(&self, request: &AugmentRequest) -> Result<QualitativeFeedback, String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = ChatRequest {
            model: self.model.clone(),
            temperature: 0.4,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt(request),
                },
            ],
        };

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|err| format!("xAI request failed: {}", err))?;

        let response = check_status(response, "xAI API error").await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| format!("xAI response parse failed: {}", err))?;

        let content = body
            .choices
            .first()
            .ok_or_else(|| "xAI response missing choices".to_string())?
            .message
            .content
            .trim()
            .to_string();

        parse_feedback(&content).ok_or_else(|| "xAI response had no usable feedback".to_string())
    }
}

#[async_trait]
impl QualitativeAugmenter for LlmClient {
    async fn augment(&self, request: &AugmentRequest) -> Result<QualitativeFeedback, String> {
        self.review_draft(request).await
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

fn system_prompt() -> String {
    let prompt = r#"You are a JSON-only reviewer of social media drafts.
Return a single JSON object with these fields:
- hook_rewrite (string: a stronger first line, same voice)
- predicted_engagement (one of "replies", "reposts", "likes", "mixed")
- tone (string: one short sentence on tone)
- suggestions (array of 2-4 short, actionable strings)
Rules:
- Output JSON only, no markdown or commentary.
- Keep the author's voice; do not add hashtags.
"#;
    prompt.to_string()
}

fn user_prompt(request: &AugmentRequest) -> String {
    let mut prompt = format!(
        "Post type: {}\n",
        request.draft.post_type.label()
    );
    if let Some(context) = request.draft.reply_context.as_deref() {
        prompt.push_str(&format!("Replying to:\n{}\n", context));
    }
    if let Some(summary) = request.profile_summary.as_deref() {
        prompt.push_str(&format!("Author's learned patterns:\n{}\n", summary));
    }
    prompt.push_str(&format!("Draft:\n{}", request.draft.text));
    prompt
}
