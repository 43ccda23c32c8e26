//! Web page text extraction.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::Scraper;

// Some hosts reject the default client; the fallback fetch masquerades
// as a desktop browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const RENDER_WIDTH: usize = 200;

static PLAIN_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
});

static BROWSER_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .expect("Failed to create HTTP client")
});

#[derive(Default)]
pub struct WebScraper;

impl WebScraper {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn fetch(client: &Client, url: &str) -> Option<String> {
        let response = client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.text().await.ok()
    }
}

#[async_trait]
impl Scraper for WebScraper {
    async fn scrape(&self, url: &str) -> Option<String> {
        let html = match Self::fetch(&PLAIN_CLIENT, url).await {
            Some(html) => html,
            None => {
                debug!("plain fetch of {url} rejected, retrying as a browser");
                Self::fetch(&BROWSER_CLIENT, url).await?
            }
        };

        match html2text::from_read(html.as_bytes(), RENDER_WIDTH) {
            Ok(text) => {
                let text = text.trim().to_string();
                if text.is_empty() { None } else { Some(text) }
            }
            Err(err) => {
                warn!("text extraction for {url} failed: {err}");
                None
            }
        }
    }
}
