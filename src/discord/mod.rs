//! The chat platform surface: the rate-limited REST client, the typed
//! bot wrapper, and channel directory helpers.

pub mod bot;
pub mod client;
pub mod directory;

pub use bot::DiscordBot;
pub use client::RestClient;

use async_trait::async_trait;
use tracing::warn;

use crate::core::models::{Channel, Message, Thread};
use crate::errors::BotError;

/// The slice of the platform's REST API the pipeline consumes.
///
/// `DiscordBot` implements this over HTTP; tests substitute an
/// in-memory fake so the orchestration logic runs without a network.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn guild_channels(&self, guild_id: &str) -> Result<Vec<Channel>, BotError>;

    async fn channel(&self, channel_id: &str) -> Result<Option<Channel>, BotError>;

    async fn active_threads(&self, guild_id: &str) -> Result<Vec<Thread>, BotError>;

    async fn archived_threads(&self, channel_id: &str, limit: u32)
    -> Result<Vec<Thread>, BotError>;

    /// Most recent messages, newest first.
    async fn recent_messages(&self, channel_id: &str, limit: u32)
    -> Result<Vec<Message>, BotError>;

    /// Messages strictly older than `before`, newest first.
    async fn messages_before(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Message>, BotError>;

    async fn create_message(&self, channel_id: &str, content: &str) -> Result<(), BotError>;

    async fn create_thread(
        &self,
        forum_channel_id: &str,
        name: &str,
        initial_content: &str,
        auto_archive_minutes: u32,
    ) -> Result<Thread, BotError>;
}

/// Page backward through a channel's history, newest first, until `max`
/// messages have been collected or the platform returns an empty batch.
/// Each batch's oldest id is the cursor for the next request.
pub async fn fetch_history(
    gateway: &dyn ChatGateway,
    channel_id: &str,
    max: usize,
) -> Vec<Message> {
    let mut collected: Vec<Message> = Vec::new();
    let mut cursor: Option<String> = None;

    while collected.len() < max {
        let page = (max - collected.len()).min(100) as u32;
        let batch = match gateway
            .messages_before(channel_id, cursor.as_deref(), page)
            .await
        {
            Ok(batch) => batch,
            Err(err) => {
                warn!("history fetch for {channel_id} failed: {err}");
                break;
            }
        };
        if batch.is_empty() {
            break;
        }
        cursor = batch.last().map(|message| message.id.clone());
        collected.extend(batch);
    }

    collected
}
