//! Find-or-create of the per-day forum thread.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::chunker::MAX_MESSAGE_LEN;
use crate::discord::ChatGateway;
use crate::errors::BotError;

/// `Summary for <date> (<weekday>)`, always in UTC so one thread covers
/// one UTC calendar day regardless of where the job runs.
#[must_use]
pub fn daily_title(now: DateTime<Utc>) -> String {
    format!("Summary for {} ({})", now.format("%Y-%m-%d"), now.format("%A"))
}

/// Today's thread title.
#[must_use]
pub fn today_title() -> String {
    daily_title(Utc::now())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolveState {
    Unknown,
    Found(String),
    Created(String),
}

pub struct Resolution {
    pub thread_id: String,
    /// The thread was created by this very call, with the caller's
    /// first chunk as its initial message.
    pub created_now: bool,
}

/// Resolves the day's thread at most once per run; later calls return
/// the cached id.
pub struct DailyThreadResolver {
    guild_id: String,
    forum_channel_id: String,
    title: String,
    check_limit: u32,
    state: ResolveState,
}

impl DailyThreadResolver {
    #[must_use]
    pub fn new(guild_id: &str, forum_channel_id: &str, title: String, check_limit: u32) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            forum_channel_id: forum_channel_id.to_string(),
            title,
            check_limit,
            state: ResolveState::Unknown,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Resolve the day's thread id, creating the thread with
    /// `first_chunk` as its initial message when nothing matches.
    pub async fn resolve(
        &mut self,
        gateway: &dyn ChatGateway,
        first_chunk: &str,
    ) -> Result<Resolution, BotError> {
        match &self.state {
            ResolveState::Found(id) | ResolveState::Created(id) => {
                return Ok(Resolution {
                    thread_id: id.clone(),
                    created_now: false,
                });
            }
            ResolveState::Unknown => {}
        }

        if let Some(id) = self.find_existing(gateway).await {
            info!("reusing daily thread '{}' ({id})", self.title);
            self.state = ResolveState::Found(id.clone());
            return Ok(Resolution {
                thread_id: id,
                created_now: false,
            });
        }

        let initial = clip_to_limit(first_chunk, MAX_MESSAGE_LEN);
        let thread = gateway
            .create_thread(&self.forum_channel_id, &self.title, &initial, 1440)
            .await?;
        info!("created daily thread '{}' ({})", self.title, thread.id);
        self.state = ResolveState::Created(thread.id.clone());
        Ok(Resolution {
            thread_id: thread.id,
            created_now: true,
        })
    }

    async fn find_existing(&self, gateway: &dyn ChatGateway) -> Option<String> {
        // Active threads are the most reliable listing.
        let active = gateway.active_threads(&self.guild_id).await.unwrap_or_default();
        if let Some(thread) = active.iter().find(|thread| {
            thread.parent_id.as_deref() == Some(self.forum_channel_id.as_str())
                && thread.name == self.title
        }) {
            return Some(thread.id.clone());
        }

        // A thread created moments ago may not be listed yet; its
        // creation marker still shows on the forum channel's own
        // messages.
        let messages = gateway
            .recent_messages(&self.forum_channel_id, self.check_limit * 2)
            .await
            .unwrap_or_default();
        for message in &messages {
            if let Some(thread) = &message.thread {
                if thread.name == self.title {
                    return Some(thread.id.clone());
                }
            }
        }

        let archived = gateway
            .archived_threads(&self.forum_channel_id, self.check_limit)
            .await
            .unwrap_or_default();
        archived
            .into_iter()
            .find(|thread| thread.name == self.title)
            .map(|thread| thread.id)
    }
}

/// Thread creation requires initial content under the message limit.
fn clip_to_limit(content: &str, limit: usize) -> String {
    if content.chars().count() <= limit {
        return content.to_string();
    }
    let clipped: String = content.chars().take(limit.saturating_sub(10)).collect();
    format!("{clipped}...")
}
