//! linkdigest - a batch bot that watches Discord channels for shared
//! links, summarizes the linked content through an LLM API, and posts
//! the summaries into a summary channel or a per-day forum thread.
//!
//! Each execution is a short, stateless pass over a bounded window of
//! recent messages, meant to be re-run by an external trigger such as
//! cron. The interesting part is the incremental posting protocol that
//! spans those runs:
//!
//! - URLs are discovered in source channels (explicit ids and/or the
//!   text channels of a monitored category).
//! - Duplicate detection decides what was already summarized, via a
//!   persisted URL record on disk, a bounded live scan of the
//!   destination forum's recent threads, or both.
//! - Forum destinations get exactly one thread per UTC calendar day,
//!   found or created once per run.
//! - Long summaries are chunked under the platform's hard message limit
//!   and delivered in order, with 429 rate limits absorbed by the HTTP
//!   client.
//!
//! A URL is recorded as processed only after its summary was delivered
//! in full, so failed runs retry naturally on the next pass.

pub mod chunker;
pub mod core;
pub mod dedup;
pub mod discord;
pub mod errors;
pub mod forum;
pub mod pipeline;
pub mod sender;
pub mod summarize;
pub mod utils;

/// Configure structured logging for a batch run. `RUST_LOG` overrides
/// the default `info` filter.
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
