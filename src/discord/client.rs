//! Rate-limited HTTP client for the chat platform's REST API.
//!
//! 429 responses are retried after the server-advertised `retry_after`
//! delay. Other GET failures degrade to `None` so lookups read as
//! "unknown, assume not found"; POST failures are retried a bounded
//! number of times with backoff before surfacing to the caller.

use once_cell::sync::Lazy;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio_retry::strategy::jitter;
use tokio_retry::{Retry, strategy::ExponentialBackoff};
use tracing::warn;

use crate::errors::BotError;

pub const API_BASE_URL: &str = "https://discord.com/api/v10";

const RATE_LIMIT_FALLBACK_SECS: f64 = 1.0;
const MAX_RATE_LIMIT_RETRIES: u32 = 10;
const POST_RETRY_BASE_MS: u64 = 500;
const POST_RETRY_ATTEMPTS: usize = 3;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("DiscordBot (linkdigest, v0.1)")
        .build()
        .expect("Failed to create HTTP client")
});

pub struct RestClient {
    auth: String,
    base_url: String,
    max_rate_limit_retries: u32,
}

impl RestClient {
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self {
            auth: format!("Bot {token}"),
            base_url: API_BASE_URL.to_string(),
            max_rate_limit_retries: MAX_RATE_LIMIT_RETRIES,
        }
    }

    /// Point the client at a different API root, e.g. a local server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// GET a JSON payload. `None` means the lookup failed for any reason
    /// other than rate limiting; callers continue as if nothing was
    /// found.
    pub async fn get(&self, path: &str) -> Option<Value> {
        let url = format!("{}{}", self.base_url, path);
        for _ in 0..=self.max_rate_limit_retries {
            let response = match HTTP_CLIENT
                .get(&url)
                .header(reqwest::header::AUTHORIZATION, self.auth.as_str())
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    warn!("GET {path} failed: {err}");
                    return None;
                }
            };

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                pause_for_rate_limit(response).await;
                continue;
            }
            if !response.status().is_success() {
                warn!("GET {path} returned status {}", response.status());
                return None;
            }
            return match response.json::<Value>().await {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!("GET {path} returned an unparseable body: {err}");
                    None
                }
            };
        }
        warn!(
            "GET {path} still rate limited after {} attempts, giving up",
            self.max_rate_limit_retries
        );
        None
    }

    /// POST a JSON payload and return the response body. Transient
    /// failures are retried with jittered exponential backoff.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, BotError> {
        let strategy = ExponentialBackoff::from_millis(POST_RETRY_BASE_MS)
            .map(jitter)
            .take(POST_RETRY_ATTEMPTS);

        Retry::spawn(strategy, || self.post_once(path, body)).await
    }

    async fn post_once(&self, path: &str, body: &Value) -> Result<Value, BotError> {
        let url = format!("{}{}", self.base_url, path);
        for _ in 0..=self.max_rate_limit_retries {
            let response = HTTP_CLIENT
                .post(&url)
                .header(reqwest::header::AUTHORIZATION, self.auth.as_str())
                .json(body)
                .send()
                .await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                pause_for_rate_limit(response).await;
                continue;
            }
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read body>".to_string());
                return Err(BotError::Api {
                    status,
                    body: body_text,
                });
            }
            return Ok(response.json::<Value>().await?);
        }
        Err(BotError::Api {
            status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
            body: "rate limit retries exhausted".to_string(),
        })
    }
}

async fn pause_for_rate_limit(response: Response) {
    let retry_after = retry_after_seconds(response.json::<Value>().await.ok());
    warn!("rate limited, sleeping for {retry_after}s");
    tokio::time::sleep(Duration::from_secs_f64(retry_after)).await;
}

/// The server-advertised wait in seconds, falling back to a fixed pause
/// when the 429 body carries none.
fn retry_after_seconds(body: Option<Value>) -> f64 {
    body.and_then(|body| body.get("retry_after").and_then(Value::as_f64))
        .unwrap_or(RATE_LIMIT_FALLBACK_SECS)
        .max(0.0)
}
