//! Live duplicate scan over a forum's recent threads.
//!
//! Best-effort: the thread and message windows are bounded, so a link
//! buried deeper than the scan window can be missed. That caps API cost
//! per run; widening the windows is a configuration change.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::models::Thread;
use crate::discord::{ChatGateway, fetch_history};

#[derive(Debug, Clone, Copy)]
pub struct ScanLimits {
    /// Maximum distinct threads scanned per check.
    pub thread_limit: usize,
    /// Maximum messages fetched per thread.
    pub message_limit: usize,
    /// Pause between scanned threads.
    pub thread_pause: Duration,
}

/// Whether `url` already appears verbatim in a message of one of the
/// forum's recent threads: the guild's active threads parented by the
/// forum, topped up with its most recently archived public threads.
pub async fn forum_contains_url(
    gateway: &dyn ChatGateway,
    guild_id: &str,
    forum_channel_id: &str,
    url: &str,
    limits: ScanLimits,
) -> bool {
    let active = match gateway.active_threads(guild_id).await {
        Ok(threads) => threads,
        Err(err) => {
            warn!("active thread listing failed: {err}");
            Vec::new()
        }
    };

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut candidates: Vec<Thread> = Vec::new();
    for thread in active {
        if thread.parent_id.as_deref() == Some(forum_channel_id)
            && seen_ids.insert(thread.id.clone())
        {
            candidates.push(thread);
        }
    }

    let remaining = limits.thread_limit.saturating_sub(candidates.len());
    if remaining > 0 {
        let archived = match gateway
            .archived_threads(forum_channel_id, remaining as u32)
            .await
        {
            Ok(threads) => threads,
            Err(err) => {
                warn!("archived thread listing failed: {err}");
                Vec::new()
            }
        };
        for thread in archived {
            if seen_ids.insert(thread.id.clone()) {
                candidates.push(thread);
            }
        }
    }

    for thread in candidates.iter().take(limits.thread_limit) {
        debug!("scanning thread '{}' ({}) for {url}", thread.name, thread.id);
        let messages = fetch_history(gateway, &thread.id, limits.message_limit).await;
        if messages.iter().any(|message| message.content.contains(url)) {
            return true;
        }
        if !limits.thread_pause.is_zero() {
            tokio::time::sleep(limits.thread_pause).await;
        }
    }

    false
}
