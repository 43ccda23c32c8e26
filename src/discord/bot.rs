//! Typed wrappers over the REST endpoints the pipeline uses.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use super::client::RestClient;
use super::ChatGateway;
use crate::core::config::AppConfig;
use crate::core::models::{Channel, Message, Thread};
use crate::errors::BotError;

pub struct DiscordBot {
    client: RestClient,
}

impl DiscordBot {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RestClient::new(&config.discord_token),
        }
    }

    #[must_use]
    pub fn with_client(client: RestClient) -> Self {
        Self { client }
    }

    fn parse_list<T: serde::de::DeserializeOwned>(value: Option<Value>, context: &str) -> Vec<T> {
        let Some(value) = value else {
            return Vec::new();
        };
        match serde_json::from_value(value) {
            Ok(items) => items,
            Err(err) => {
                warn!("unexpected payload for {context}: {err}");
                Vec::new()
            }
        }
    }

    /// Thread listings arrive wrapped as `{"threads": [...]}`.
    fn parse_thread_list(value: Option<Value>, context: &str) -> Vec<Thread> {
        let threads = value.and_then(|mut value| {
            value
                .get_mut("threads")
                .map(Value::take)
        });
        Self::parse_list(threads, context)
    }
}

#[async_trait]
impl ChatGateway for DiscordBot {
    async fn guild_channels(&self, guild_id: &str) -> Result<Vec<Channel>, BotError> {
        let value = self.client.get(&format!("/guilds/{guild_id}/channels")).await;
        Ok(Self::parse_list(value, "guild channels"))
    }

    async fn channel(&self, channel_id: &str) -> Result<Option<Channel>, BotError> {
        let value = self.client.get(&format!("/channels/{channel_id}")).await;
        Ok(value.and_then(|value| serde_json::from_value(value).ok()))
    }

    async fn active_threads(&self, guild_id: &str) -> Result<Vec<Thread>, BotError> {
        let value = self
            .client
            .get(&format!("/guilds/{guild_id}/threads/active"))
            .await;
        Ok(Self::parse_thread_list(value, "active threads"))
    }

    async fn archived_threads(
        &self,
        channel_id: &str,
        limit: u32,
    ) -> Result<Vec<Thread>, BotError> {
        let value = self
            .client
            .get(&format!(
                "/channels/{channel_id}/threads/archived/public?limit={limit}"
            ))
            .await;
        Ok(Self::parse_thread_list(value, "archived threads"))
    }

    async fn recent_messages(
        &self,
        channel_id: &str,
        limit: u32,
    ) -> Result<Vec<Message>, BotError> {
        self.messages_before(channel_id, None, limit).await
    }

    async fn messages_before(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Message>, BotError> {
        let mut path = format!("/channels/{channel_id}/messages?limit={limit}");
        if let Some(cursor) = before {
            path.push_str(&format!("&before={cursor}"));
        }
        let value = self.client.get(&path).await;
        Ok(Self::parse_list(value, "channel messages"))
    }

    async fn create_message(&self, channel_id: &str, content: &str) -> Result<(), BotError> {
        let body = json!({ "content": content });
        self.client
            .post(&format!("/channels/{channel_id}/messages"), &body)
            .await?;
        Ok(())
    }

    async fn create_thread(
        &self,
        forum_channel_id: &str,
        name: &str,
        initial_content: &str,
        auto_archive_minutes: u32,
    ) -> Result<Thread, BotError> {
        let body = json!({
            "name": name,
            "auto_archive_duration": auto_archive_minutes,
            "message": { "content": initial_content },
        });
        let value = self
            .client
            .post(&format!("/channels/{forum_channel_id}/threads"), &body)
            .await?;
        serde_json::from_value(value)
            .map_err(|err| BotError::Payload(format!("thread creation response: {err}")))
    }
}
