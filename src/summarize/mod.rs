//! Summarization collaborators and the prompt-selection rule.
//!
//! Scraping and generation are consumed as black boxes behind these
//! traits; the pipeline never sees transport details.

pub mod gemini;
pub mod scraper;

pub use gemini::GeminiClient;
pub use scraper::WebScraper;

use async_trait::async_trait;

use crate::errors::BotError;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Best-effort extraction of a page's visible text. `None` means
    /// the fetch or the extraction failed; the caller skips the URL for
    /// this run.
    async fn scrape(&self, url: &str) -> Option<String>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Single-shot text generation. Failures surface as `None`, never
    /// as an error.
    async fn summarize(&self, prompt: &str) -> Option<String>;

    /// Summarize a hosted video by URL. Transport failures may surface
    /// as `Err`; callers treat them like an empty result.
    async fn summarize_video(&self, url: &str) -> Result<Option<String>, BotError>;
}

/// Video-hosting URLs take the multimodal path instead of
/// scrape-then-summarize.
#[must_use]
pub fn is_video_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Pick the generation prompt for a scraped page. Discussion-forum
/// pages get a prompt tuned to threads and user opinions; everything
/// else gets the generic point-form prompt.
#[must_use]
pub fn prompt_for(url: &str, page_text: &str) -> String {
    if url.contains("reddit.com") {
        format!(
            "Summarize the key points and main discussion from the following Reddit post \
             content within 1500 characters. Focus on the post's topic, user opinions, and any \
             conclusions drawn. Ignore site navigation elements and generic Reddit boilerplate. \
             Use English point form:\n\n{page_text}"
        )
    } else {
        format!(
            "Without any explanation, just summarize this in English point form with minimal \
             losing in information and ignore useless information for news consumer:\n\n{page_text}"
        )
    }
}
