//! Durable record of URLs whose summaries were already delivered.
//!
//! A flat JSON array on disk, loaded fully at startup and rewritten
//! wholesale after each recorded URL. Entries are never removed. A URL
//! is recorded only after its summary was posted in full, so a crashed
//! run retries its unsaved URLs instead of losing them.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::BotError;

pub struct ProcessedUrlStore {
    path: PathBuf,
    urls: HashSet<String>,
}

impl ProcessedUrlStore {
    /// Load the record. A missing or unreadable file starts empty; the
    /// record only ever grows, so starting fresh merely re-summarizes.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let urls = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => {
                    info!("loaded {} processed URLs from {}", list.len(), path.display());
                    list.into_iter().collect()
                }
                Err(err) => {
                    warn!("could not parse {}: {err}; starting fresh", path.display());
                    HashSet::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, starting fresh", path.display());
                HashSet::new()
            }
            Err(err) => {
                warn!("could not read {}: {err}; starting fresh", path.display());
                HashSet::new()
            }
        };
        Self {
            path: path.to_path_buf(),
            urls,
        }
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Insert and rewrite the whole file. Call only after the summary
    /// was delivered in full.
    pub fn record(&mut self, url: &str) -> Result<(), BotError> {
        if !self.urls.insert(url.to_string()) {
            return Ok(());
        }
        self.save()
    }

    fn save(&self) -> Result<(), BotError> {
        let mut list: Vec<&String> = self.urls.iter().collect();
        list.sort();
        let raw = serde_json::to_string_pretty(&list).map_err(io::Error::from)?;
        // Whole-file replacement via rename keeps a crash mid-write from
        // corrupting the record.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
