//! Pipeline behavior against an in-memory chat gateway: idempotence,
//! duplicate short-circuits, daily-thread reuse, and failure isolation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use linkdigest::core::config::AppConfig;
use linkdigest::core::models::{
    Author, Channel, ChannelType, Destination, Message, Thread, ThreadMetadata,
};
use linkdigest::discord::ChatGateway;
use linkdigest::errors::BotError;
use linkdigest::forum::today_title;
use linkdigest::pipeline::SummaryPipeline;
use linkdigest::sender::send_long;
use linkdigest::summarize::{Scraper, Summarizer};

const SOURCE: &str = "src";
const FORUM: &str = "forum";

fn message(id: u64, content: &str) -> Message {
    Message {
        id: id.to_string(),
        content: content.to_string(),
        author: Author::default(),
        embeds: Vec::new(),
        thread: None,
    }
}

#[derive(Default)]
struct GuildState {
    channels: Vec<Channel>,
    /// Channel or thread id -> messages, newest first.
    messages: HashMap<String, Vec<Message>>,
    threads: Vec<Thread>,
    created_threads: usize,
    /// Every create_message in order: (target id, content).
    posts: Vec<(String, String)>,
    /// Posting content containing this substring fails.
    fail_posts_containing: Option<String>,
    next_message_id: u64,
}

#[derive(Default)]
struct FakeGateway {
    state: Mutex<GuildState>,
}

impl FakeGateway {
    fn with_source_messages(messages: Vec<Message>) -> Self {
        let gateway = Self::default();
        {
            let mut state = gateway.state.lock().expect("lock");
            state.channels = vec![Channel {
                id: SOURCE.to_string(),
                name: "news".to_string(),
                kind: ChannelType::Text,
                parent_id: None,
            }];
            state.messages.insert(SOURCE.to_string(), messages);
            state.next_message_id = 1000;
        }
        gateway
    }

    fn posts(&self) -> Vec<(String, String)> {
        self.state.lock().expect("lock").posts.clone()
    }

    fn created_threads(&self) -> usize {
        self.state.lock().expect("lock").created_threads
    }

    fn fail_posts_containing(&self, needle: &str) {
        self.state.lock().expect("lock").fail_posts_containing = Some(needle.to_string());
    }

    fn thread_named(&self, name: &str) -> Option<Thread> {
        self.state
            .lock()
            .expect("lock")
            .threads
            .iter()
            .find(|thread| thread.name == name)
            .cloned()
    }
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn guild_channels(&self, _guild_id: &str) -> Result<Vec<Channel>, BotError> {
        Ok(self.state.lock().expect("lock").channels.clone())
    }

    async fn channel(&self, channel_id: &str) -> Result<Option<Channel>, BotError> {
        Ok(self
            .state
            .lock()
            .expect("lock")
            .channels
            .iter()
            .find(|channel| channel.id == channel_id)
            .cloned())
    }

    async fn active_threads(&self, _guild_id: &str) -> Result<Vec<Thread>, BotError> {
        Ok(self
            .state
            .lock()
            .expect("lock")
            .threads
            .iter()
            .filter(|thread| {
                !thread
                    .thread_metadata
                    .as_ref()
                    .is_some_and(|meta| meta.archived)
            })
            .cloned()
            .collect())
    }

    async fn archived_threads(
        &self,
        channel_id: &str,
        limit: u32,
    ) -> Result<Vec<Thread>, BotError> {
        Ok(self
            .state
            .lock()
            .expect("lock")
            .threads
            .iter()
            .filter(|thread| thread.parent_id.as_deref() == Some(channel_id))
            .filter(|thread| {
                thread
                    .thread_metadata
                    .as_ref()
                    .is_some_and(|meta| meta.archived)
            })
            .take(limit as usize)
            .cloned()
            .collect())
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
        let state = self.state.lock().expect("lock");
        let Some(all) = state.messages.get(channel_id) else {
            return Ok(Vec::new());
        };
        let start = match before {
            None => 0,
            Some(cursor) => match all.iter().position(|message| message.id == cursor) {
                Some(position) => position + 1,
                None => return Ok(Vec::new()),
            },
        };
        Ok(all.iter().skip(start).take(limit as usize).cloned().collect())
    }

    async fn create_message(&self, channel_id: &str, content: &str) -> Result<(), BotError> {
        let mut state = self.state.lock().expect("lock");
        if let Some(needle) = state.fail_posts_containing.clone() {
            if content.contains(&needle) {
                return Err(BotError::Api {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
        }
        state.next_message_id += 1;
        let id = state.next_message_id;
        state.posts.push((channel_id.to_string(), content.to_string()));
        state
            .messages
            .entry(channel_id.to_string())
            .or_default()
            .insert(0, message(id, content));
        Ok(())
    }

    async fn create_thread(
        &self,
        forum_channel_id: &str,
        name: &str,
        initial_content: &str,
        _auto_archive_minutes: u32,
    ) -> Result<Thread, BotError> {
        let mut state = self.state.lock().expect("lock");
        state.created_threads += 1;
        let thread_id = format!("thread-{}", state.created_threads);
        let thread = Thread {
            id: thread_id.clone(),
            name: name.to_string(),
            parent_id: Some(forum_channel_id.to_string()),
            thread_metadata: Some(ThreadMetadata { archived: false }),
        };
        state.threads.push(thread.clone());
        state.next_message_id += 1;
        let id = state.next_message_id;
        state
            .posts
            .push((thread_id.clone(), initial_content.to_string()));
        state
            .messages
            .entry(thread_id)
            .or_default()
            .insert(0, message(id, initial_content));
        Ok(thread)
    }
}

#[derive(Default)]
struct FakeScraper {
    calls: AtomicUsize,
}

#[async_trait]
impl Scraper for FakeScraper {
    async fn scrape(&self, url: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(format!("page text for {url}"))
    }
}

#[derive(Default)]
struct FakeSummarizer {
    calls: AtomicUsize,
    video_calls: AtomicUsize,
    output: Option<String>,
}

impl FakeSummarizer {
    fn with_output(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, _prompt: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| "a tidy summary".to_string()),
        )
    }

    async fn summarize_video(&self, url: &str) -> Result<Option<String>, BotError> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(format!("video summary of {url}")))
    }
}

fn config_for(destination: Destination, store_path: Option<PathBuf>) -> AppConfig {
    AppConfig {
        discord_token: "token".to_string(),
        guild_id: "guild".to_string(),
        source_channel_ids: vec![SOURCE.to_string()],
        category_name: None,
        destination,
        excluded_channel_names: Vec::new(),
        excluded_url_domains: vec!["x.com".to_string()],
        processed_urls_path: store_path,
        message_fetch_limit: 20,
        forum_thread_check_limit: 5,
        duplicate_scan_thread_limit: 5,
        duplicate_scan_message_limit: 100,
        google_api_key: "key".to_string(),
        gemini_model: "model".to_string(),
        chunk_send_delay: Duration::ZERO,
        url_process_delay: Duration::ZERO,
        thread_scan_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn two_urls_share_one_daily_thread_in_chronological_order() {
    let gateway = FakeGateway::with_source_messages(vec![
        message(2, "later link https://example.com/b"),
        message(1, "first link https://example.com/a"),
    ]);
    let scraper = FakeScraper::default();
    let summarizer = FakeSummarizer::default();
    let config = config_for(Destination::Forum(FORUM.to_string()), None);

    let mut pipeline = SummaryPipeline::new(&gateway, &scraper, &summarizer, &config);
    let report = pipeline.run().await.expect("run succeeds");

    assert_eq!(report.posted, 2);
    assert_eq!(gateway.created_threads(), 1, "exactly one thread per day");

    let thread = gateway
        .thread_named(&today_title())
        .expect("the thread carries the daily title");
    let posts = gateway.posts();
    let in_thread: Vec<&(String, String)> = posts
        .iter()
        .filter(|(target, _)| *target == thread.id)
        .collect();
    assert_eq!(in_thread.len(), 2);
    assert!(
        in_thread[0].1.contains("https://example.com/a"),
        "the older link posts first"
    );
    assert!(in_thread[1].1.contains("https://example.com/b"));
}

#[tokio::test]
async fn a_second_run_over_the_same_window_posts_nothing_new() {
    let gateway = FakeGateway::with_source_messages(vec![
        message(2, "later link https://example.com/b"),
        message(1, "first link https://example.com/a"),
    ]);
    let scraper = FakeScraper::default();
    let summarizer = FakeSummarizer::default();
    let config = config_for(Destination::Forum(FORUM.to_string()), None);

    let mut first = SummaryPipeline::new(&gateway, &scraper, &summarizer, &config);
    first.run().await.expect("first run succeeds");
    let posts_after_first = gateway.posts().len();
    let generation_calls = summarizer.calls.load(Ordering::SeqCst);

    let mut second = SummaryPipeline::new(&gateway, &scraper, &summarizer, &config);
    let report = second.run().await.expect("second run succeeds");

    assert_eq!(report.posted, 0);
    assert_eq!(report.duplicates, 2);
    assert_eq!(gateway.posts().len(), posts_after_first, "no new posts");
    assert_eq!(
        summarizer.calls.load(Ordering::SeqCst),
        generation_calls,
        "duplicates are detected before spending generation calls"
    );
}

#[tokio::test]
async fn the_persisted_record_short_circuits_before_any_external_call() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("processed_urls.json");
    std::fs::write(&path, r#"["https://example.com/x"]"#).expect("seed the record");

    let gateway =
        FakeGateway::with_source_messages(vec![message(1, "see https://example.com/x today")]);
    let scraper = FakeScraper::default();
    let summarizer = FakeSummarizer::default();
    let config = config_for(Destination::Channel("dest".to_string()), Some(path));

    let mut pipeline = SummaryPipeline::new(&gateway, &scraper, &summarizer, &config);
    let report = pipeline.run().await.expect("run succeeds");

    assert_eq!(report.duplicates, 1);
    assert_eq!(scraper.calls.load(Ordering::SeqCst), 0, "no scrape for a known URL");
    assert_eq!(summarizer.calls.load(Ordering::SeqCst), 0);
    assert!(gateway.posts().is_empty());
}

#[tokio::test]
async fn a_failed_send_leaves_only_that_url_unrecorded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("processed_urls.json");

    let gateway = FakeGateway::with_source_messages(vec![
        message(2, "https://example.com/b"),
        message(1, "https://example.com/a"),
    ]);
    gateway.fail_posts_containing("https://example.com/b");
    let scraper = FakeScraper::default();
    let summarizer = FakeSummarizer::default();
    let config = config_for(Destination::Channel("dest".to_string()), Some(path.clone()));

    let mut pipeline = SummaryPipeline::new(&gateway, &scraper, &summarizer, &config);
    let report = pipeline.run().await.expect("the run completes despite the failure");

    assert_eq!(report.posted, 1);
    assert_eq!(report.failed, 1);

    let record = std::fs::read_to_string(&path).expect("record written");
    assert!(record.contains("https://example.com/a"));
    assert!(
        !record.contains("https://example.com/b"),
        "a failed post must stay unrecorded so the next run retries it"
    );
}

#[tokio::test]
async fn excluded_domains_are_skipped_without_scraping() {
    let gateway =
        FakeGateway::with_source_messages(vec![message(1, "https://x.com/status/123456")]);
    let scraper = FakeScraper::default();
    let summarizer = FakeSummarizer::default();
    let config = config_for(Destination::Channel("dest".to_string()), None);

    let mut pipeline = SummaryPipeline::new(&gateway, &scraper, &summarizer, &config);
    let report = pipeline.run().await.expect("run succeeds");

    assert_eq!(report.skipped, 1);
    assert_eq!(scraper.calls.load(Ordering::SeqCst), 0);
    assert!(gateway.posts().is_empty());
}

#[tokio::test]
async fn video_urls_take_the_video_summarizer_path() {
    let gateway = FakeGateway::with_source_messages(vec![message(1, "https://youtu.be/abc123")]);
    let scraper = FakeScraper::default();
    let summarizer = FakeSummarizer::default();
    let config = config_for(Destination::Channel("dest".to_string()), None);

    let mut pipeline = SummaryPipeline::new(&gateway, &scraper, &summarizer, &config);
    let report = pipeline.run().await.expect("run succeeds");

    assert_eq!(report.posted, 1);
    assert_eq!(scraper.calls.load(Ordering::SeqCst), 0, "videos are not scraped");
    assert_eq!(summarizer.video_calls.load(Ordering::SeqCst), 1);
    assert!(gateway.posts()[0].1.contains("video summary"));
}

#[tokio::test]
async fn long_summaries_arrive_in_order_and_under_the_limit() {
    let gateway =
        FakeGateway::with_source_messages(vec![message(1, "https://example.com/long-read")]);
    let scraper = FakeScraper::default();
    let summarizer = FakeSummarizer::with_output("lorem ipsum dolor sit amet ".repeat(250));
    let config = config_for(Destination::Channel("dest".to_string()), None);

    let mut pipeline = SummaryPipeline::new(&gateway, &scraper, &summarizer, &config);
    let report = pipeline.run().await.expect("run succeeds");

    assert_eq!(report.posted, 1);
    let posts = gateway.posts();
    assert!(posts.len() > 1, "an oversized summary is chunked");
    for (target, content) in &posts {
        assert_eq!(target, "dest");
        assert!(content.chars().count() <= 2000);
        assert!(content.contains("https://example.com/long-read"));
    }
}

#[tokio::test]
async fn a_mid_sequence_chunk_failure_aborts_the_rest() {
    let gateway = FakeGateway::with_source_messages(Vec::new());
    gateway.fail_posts_containing("MARKER");

    let mut text = "padding line\n".repeat(30);
    text.push_str("MARKER line\n");
    text.push_str(&"trailing line\n".repeat(30));

    let err = send_long(&gateway, "dest", &text, 100, Duration::ZERO)
        .await
        .expect_err("the marked chunk fails");
    match err {
        BotError::ChunkSend { index, total, .. } => {
            assert!(index > 0, "earlier chunks were sent");
            assert!(index < total);
            assert_eq!(
                gateway.posts().len(),
                index,
                "nothing after the failed chunk is sent"
            );
        }
        other => panic!("expected a chunk send failure, got {other}"),
    }
}
