use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("failed to send HTTP request: {0}")]
    Http(String),

    #[error("chat API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected API payload: {0}")]
    Payload(String),

    #[error("failed to persist processed URL record: {0}")]
    Store(#[from] std::io::Error),

    #[error("summarizer transport failure: {0}")]
    Summarizer(String),

    #[error("send failed at chunk {index} of {total}: {source}")]
    ChunkSend {
        index: usize,
        total: usize,
        #[source]
        source: Box<BotError>,
    },
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::Http(error.to_string())
    }
}
