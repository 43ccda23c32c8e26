use serde::Deserialize;

/// Channel kinds we distinguish, decoded from the wire `type` integer.
/// Anything we do not care about collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u8")]
pub enum ChannelType {
    Text,
    Announcement,
    Category,
    Forum,
    Other,
}

impl From<u8> for ChannelType {
    fn from(raw: u8) -> Self {
        match raw {
            0 => ChannelType::Text,
            4 => ChannelType::Category,
            5 => ChannelType::Announcement,
            15 => ChannelType::Forum,
            _ => ChannelType::Other,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub url: Option<String>,
}

/// Thread-creation marker carried on a forum channel's own messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A fetched message. Ids are opaque snowflake strings; they sort by
/// creation time and serve as `before` pagination cursors.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Author,
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde(default)]
    pub thread: Option<ThreadRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadMetadata {
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub thread_metadata: Option<ThreadMetadata>,
}

/// Where summaries go: straight into a channel, or into the day's thread
/// of a forum channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Channel(String),
    Forum(String),
}

/// Per-run outcome for one URL. In-memory only; the persisted record
/// keeps nothing but the URLs that reached `Posted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Present in the persisted URL record.
    DuplicateHistorical,
    /// Found by scanning the destination's recent threads.
    DuplicateLive,
    /// Domain is on the exclusion list.
    SkippedDomain,
    ScrapeFailed,
    SummaryFailed,
    SummaryEmpty,
    PostFailed(PostFailure),
    Posted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFailure {
    ThreadCreate,
    Chunk,
    Formatting,
}
