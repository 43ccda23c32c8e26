//! Ordered delivery of message chunks with inter-send pacing.

use std::time::Duration;

use tracing::{error, info};

use crate::chunker::split_message;
use crate::discord::ChatGateway;
use crate::errors::BotError;

/// Post chunks in order. The first failure aborts the rest; the caller
/// must treat a partially delivered summary as undelivered.
pub async fn send_chunks(
    gateway: &dyn ChatGateway,
    channel_id: &str,
    chunks: &[String],
    pause: Duration,
) -> Result<(), BotError> {
    for (index, chunk) in chunks.iter().enumerate() {
        if index > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        if chunks.len() > 1 {
            info!("sending chunk {}/{} to {channel_id}", index + 1, chunks.len());
        }
        gateway
            .create_message(channel_id, chunk)
            .await
            .map_err(|source| {
                error!(
                    "chunk {}/{} to {channel_id} failed: {source}",
                    index + 1,
                    chunks.len()
                );
                BotError::ChunkSend {
                    index,
                    total: chunks.len(),
                    source: Box::new(source),
                }
            })?;
    }
    Ok(())
}

/// Split `text` under `limit` and deliver every chunk.
pub async fn send_long(
    gateway: &dyn ChatGateway,
    channel_id: &str,
    text: &str,
    limit: usize,
    pause: Duration,
) -> Result<(), BotError> {
    let chunks = split_message(text, limit);
    send_chunks(gateway, channel_id, &chunks, pause).await
}
