//! The per-run orchestrator: discover source channels, walk their
//! recent messages oldest-first, and run each first-URL through the
//! skip / duplicate / summarize / deliver chain, recording one outcome
//! per URL.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::chunker::{MAX_MESSAGE_LEN, format_summary_entry};
use crate::core::config::AppConfig;
use crate::core::models::{Destination, PostFailure, ProcessStatus};
use crate::dedup::{ProcessedUrlStore, ScanLimits, forum_contains_url};
use crate::discord::{ChatGateway, directory};
use crate::errors::BotError;
use crate::forum::{DailyThreadResolver, today_title};
use crate::sender::send_chunks;
use crate::summarize::{Scraper, Summarizer, is_video_url, prompt_for};
use crate::utils::links::{domain_matches, first_url_in_message};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub posted: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

struct SourceChannel {
    id: String,
    name: String,
}

pub struct SummaryPipeline<'a> {
    gateway: &'a dyn ChatGateway,
    scraper: &'a dyn Scraper,
    summarizer: &'a dyn Summarizer,
    config: &'a AppConfig,
    store: Option<ProcessedUrlStore>,
    statuses: HashMap<String, ProcessStatus>,
}

impl<'a> SummaryPipeline<'a> {
    #[must_use]
    pub fn new(
        gateway: &'a dyn ChatGateway,
        scraper: &'a dyn Scraper,
        summarizer: &'a dyn Summarizer,
        config: &'a AppConfig,
    ) -> Self {
        let store = config
            .processed_urls_path
            .as_deref()
            .map(ProcessedUrlStore::load);
        Self {
            gateway,
            scraper,
            summarizer,
            config,
            store,
            statuses: HashMap::new(),
        }
    }

    /// Outcomes of the URLs seen this run.
    #[must_use]
    pub fn statuses(&self) -> &HashMap<String, ProcessStatus> {
        &self.statuses
    }

    pub async fn run(&mut self) -> Result<RunReport, BotError> {
        let sources = self.resolve_sources().await;
        if sources.is_empty() {
            warn!("no source channels to process");
            return Ok(RunReport::default());
        }

        // The daily thread is resolved lazily, at most once per run.
        let mut resolver = match &self.config.destination {
            Destination::Forum(forum_id) => Some(DailyThreadResolver::new(
                &self.config.guild_id,
                forum_id,
                today_title(),
                self.config.forum_thread_check_limit,
            )),
            Destination::Channel(_) => None,
        };

        for source in &sources {
            info!("processing channel {} ({})", source.name, source.id);
            let messages = self
                .gateway
                .recent_messages(&source.id, self.config.message_fetch_limit)
                .await
                .unwrap_or_default();
            if messages.is_empty() {
                continue;
            }

            // Oldest first, so several links land in chronological order.
            for message in messages.iter().rev() {
                let Some(url) = first_url_in_message(message) else {
                    continue;
                };
                if self.statuses.contains_key(&url) {
                    continue;
                }
                let status = self
                    .process_url(&url, &source.name, resolver.as_mut())
                    .await;
                info!("{url}: {status:?}");
                self.statuses.insert(url, status);
                if !self.config.url_process_delay.is_zero() {
                    tokio::time::sleep(self.config.url_process_delay).await;
                }
            }
        }

        Ok(self.report())
    }

    async fn process_url(
        &mut self,
        url: &str,
        source_label: &str,
        resolver: Option<&mut DailyThreadResolver>,
    ) -> ProcessStatus {
        if self
            .config
            .excluded_url_domains
            .iter()
            .any(|domain| domain_matches(url, domain))
        {
            info!("skipping excluded domain: {url}");
            return ProcessStatus::SkippedDomain;
        }

        if let Some(store) = &self.store {
            if store.contains(url) {
                return ProcessStatus::DuplicateHistorical;
            }
        }

        if let Destination::Forum(forum_id) = &self.config.destination {
            let limits = ScanLimits {
                thread_limit: self.config.duplicate_scan_thread_limit as usize,
                message_limit: self.config.duplicate_scan_message_limit as usize,
                thread_pause: self.config.thread_scan_delay,
            };
            if forum_contains_url(self.gateway, &self.config.guild_id, forum_id, url, limits)
                .await
            {
                info!("already summarized in forum: {url}");
                return ProcessStatus::DuplicateLive;
            }
        }

        let summary = match self.obtain_summary(url).await {
            Ok(summary) => summary,
            Err(status) => return status,
        };

        self.deliver(url, source_label, &summary, resolver).await
    }

    /// Scrape-then-summarize for pages, the multimodal path for video
    /// URLs. The failed stage is the outcome.
    async fn obtain_summary(&self, url: &str) -> Result<String, ProcessStatus> {
        let raw = if is_video_url(url) {
            match self.summarizer.summarize_video(url).await {
                Ok(text) => text,
                Err(err) => {
                    warn!("video summarization failed for {url}: {err}");
                    None
                }
            }
        } else {
            let Some(page_text) = self.scraper.scrape(url).await else {
                warn!("scrape failed for {url}");
                return Err(ProcessStatus::ScrapeFailed);
            };
            self.summarizer
                .summarize(&prompt_for(url, &page_text))
                .await
        };

        let Some(raw) = raw else {
            return Err(ProcessStatus::SummaryFailed);
        };
        let summary = raw.trim().to_string();
        if summary.is_empty() {
            return Err(ProcessStatus::SummaryEmpty);
        }
        Ok(summary)
    }

    async fn deliver(
        &mut self,
        url: &str,
        source_label: &str,
        summary: &str,
        resolver: Option<&mut DailyThreadResolver>,
    ) -> ProcessStatus {
        let chunks = format_summary_entry(url, source_label, summary, MAX_MESSAGE_LEN);
        let Some(first_chunk) = chunks.first() else {
            return ProcessStatus::PostFailed(PostFailure::Formatting);
        };

        let (target_id, skip_first) = match (&self.config.destination, resolver) {
            (Destination::Channel(channel_id), _) => (channel_id.clone(), false),
            (Destination::Forum(_), Some(resolver)) => {
                match resolver.resolve(self.gateway, first_chunk).await {
                    Ok(resolution) => (resolution.thread_id, resolution.created_now),
                    Err(err) => {
                        warn!("daily thread resolution failed for {url}: {err}");
                        return ProcessStatus::PostFailed(PostFailure::ThreadCreate);
                    }
                }
            }
            // run() always pairs a forum destination with a resolver.
            (Destination::Forum(_), None) => {
                return ProcessStatus::PostFailed(PostFailure::ThreadCreate);
            }
        };

        // A thread created just now already carries the first chunk as
        // its initial message.
        let remaining = if skip_first { &chunks[1..] } else { &chunks[..] };
        if let Err(err) = send_chunks(
            self.gateway,
            &target_id,
            remaining,
            self.config.chunk_send_delay,
        )
        .await
        {
            warn!("delivery failed for {url}: {err}");
            return ProcessStatus::PostFailed(PostFailure::Chunk);
        }

        if let Some(store) = &mut self.store {
            if let Err(err) = store.record(url) {
                warn!("could not save processed URL record after {url}: {err}");
            }
        }
        ProcessStatus::Posted
    }

    async fn resolve_sources(&self) -> Vec<SourceChannel> {
        let mut sources: Vec<SourceChannel> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let destination_id = match &self.config.destination {
            Destination::Channel(id) | Destination::Forum(id) => id.clone(),
        };

        for id in &self.config.source_channel_ids {
            if *id == destination_id || !seen.insert(id.clone()) {
                continue;
            }
            let name = match self.gateway.channel(id).await {
                Ok(Some(channel)) => channel.name,
                _ => format!("channel-{id}"),
            };
            sources.push(SourceChannel {
                id: id.clone(),
                name,
            });
        }

        if let Some(category_name) = &self.config.category_name {
            let channels = self
                .gateway
                .guild_channels(&self.config.guild_id)
                .await
                .unwrap_or_default();
            let in_category = directory::channels_in_category(
                &channels,
                category_name,
                &self.config.excluded_channel_names,
            );
            if in_category.is_empty() {
                warn!("category '{category_name}' not found or has no usable channels");
            }
            for channel in in_category {
                if channel.id == destination_id || !seen.insert(channel.id.clone()) {
                    continue;
                }
                sources.push(SourceChannel {
                    id: channel.id,
                    name: channel.name,
                });
            }
        }

        sources
    }

    fn report(&self) -> RunReport {
        let mut report = RunReport::default();
        for status in self.statuses.values() {
            match status {
                ProcessStatus::Posted => report.posted += 1,
                ProcessStatus::DuplicateHistorical | ProcessStatus::DuplicateLive => {
                    report.duplicates += 1;
                }
                ProcessStatus::SkippedDomain => report.skipped += 1,
                ProcessStatus::ScrapeFailed
                | ProcessStatus::SummaryFailed
                | ProcessStatus::SummaryEmpty
                | ProcessStatus::PostFailed(_) => report.failed += 1,
            }
        }
        report
    }
}
