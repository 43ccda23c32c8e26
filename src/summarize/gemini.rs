//! Gemini REST client for text and video summaries.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::warn;

use super::Summarizer;
use crate::errors::BotError;

const GENERATE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const VIDEO_PROMPT: &str = "Analyze the following video. Provide a concise summary covering \
     the main thesis, the key topics with the specific examples mentioned, any explicit calls \
     to action, and a short overall summary. Answer without explanation.";

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .expect("Failed to create HTTP client")
});

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: GENERATE_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root, e.g. a local server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    async fn generate(&self, body: Value) -> Result<Option<String>, BotError> {
        let response = HTTP_CLIENT.post(self.endpoint()).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(BotError::Summarizer(format!(
                "generateContent returned status {}",
                response.status()
            )));
        }
        let payload: Value = response.json().await?;
        Ok(candidate_text(&payload))
    }
}

fn candidate_text(payload: &Value) -> Option<String> {
    payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, prompt: &str) -> Option<String> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        match self.generate(body).await {
            Ok(text) => text,
            Err(err) => {
                warn!("summary generation failed: {err}");
                None
            }
        }
    }

    async fn summarize_video(&self, url: &str) -> Result<Option<String>, BotError> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": VIDEO_PROMPT },
                    { "file_data": { "file_uri": url } },
                ],
            }],
        });
        self.generate(body).await
    }
}
