// region:    --- Imports
use crate::error::{AppError, AppResult};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
// endregion: --- Imports

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 300;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You are the assistant of Mazadi, an online auction marketplace. \
Answer questions about registering, bidding, payments, shipping and support briefly. \
Reply in the language of the question.";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Non-streaming client for the Anthropic Messages API.
pub struct LanguageModel {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl LanguageModel {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            model,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn generate(&self, input: &str) -> AppResult<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": input }]
        });

        let response = self
            .http
            .post(&self.api_url)
            .timeout(self.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        let parsed = response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;
        let text = join_text(parsed.content);
        debug!("{:<12} --> Model replied with {} chars", "Chatbot", text.len());
        Ok(text)
    }
}

fn join_text(blocks: Vec<ContentBlock>) -> String {
    blocks
        .into_iter()
        .filter(|b| b.kind == "text")
        .map(|b| b.text)
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string()
}
