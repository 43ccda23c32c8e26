use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::models::Destination;

/// Everything the bot reads from the environment, collected once at
/// startup and passed by reference into each component. Missing required
/// settings abort the run before any network activity.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord_token: String,
    pub guild_id: String,
    /// Explicitly configured source channels; may be empty when a
    /// category is monitored instead.
    pub source_channel_ids: Vec<String>,
    /// Category whose text channels are scanned as additional sources.
    pub category_name: Option<String>,
    pub destination: Destination,
    /// Channel names inside the monitored category that are never
    /// treated as sources.
    pub excluded_channel_names: Vec<String>,
    /// Domains whose links are skipped outright.
    pub excluded_url_domains: Vec<String>,
    /// Enables the persisted-set duplicate strategy when set.
    pub processed_urls_path: Option<PathBuf>,
    pub message_fetch_limit: u32,
    pub forum_thread_check_limit: u32,
    pub duplicate_scan_thread_limit: u32,
    pub duplicate_scan_message_limit: u32,
    pub google_api_key: String,
    pub gemini_model: String,
    pub chunk_send_delay: Duration,
    pub url_process_delay: Duration,
    pub thread_scan_delay: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let forum_channel_id = env::var("FORUM_CHANNEL_ID").ok();
        let summary_channel_id = env::var("SUMMARY_CHANNEL_ID").ok();
        let destination = match (forum_channel_id, summary_channel_id) {
            (Some(id), _) => Destination::Forum(id),
            (None, Some(id)) => Destination::Channel(id),
            (None, None) => {
                return Err("either FORUM_CHANNEL_ID or SUMMARY_CHANNEL_ID must be set".to_string());
            }
        };

        let source_channel_ids = match env::var("SOURCE_CHANNEL_IDS") {
            Ok(raw) => parse_id_list(&raw).map_err(|e| format!("SOURCE_CHANNEL_IDS: {e}"))?,
            Err(_) => Vec::new(),
        };
        let category_name = env::var("BOT_CATEGORY_NAME").ok();
        if source_channel_ids.is_empty() && category_name.is_none() {
            return Err("either SOURCE_CHANNEL_IDS or BOT_CATEGORY_NAME must be set".to_string());
        }

        let mut excluded_url_domains = csv_var("EXCLUDED_URL_DOMAINS");
        if excluded_url_domains.is_empty() {
            excluded_url_domains.push("x.com".to_string());
        }

        Ok(Self {
            discord_token: require("DISCORD_TOKEN")?,
            guild_id: require("GUILD_ID")?,
            source_channel_ids,
            category_name,
            destination,
            excluded_channel_names: csv_var("EXCLUDED_CHANNEL_NAMES"),
            excluded_url_domains,
            processed_urls_path: env::var("PROCESSED_URLS_FILE").ok().map(PathBuf::from),
            message_fetch_limit: numeric_var("MESSAGE_FETCH_LIMIT", 20)?,
            forum_thread_check_limit: numeric_var("FORUM_THREAD_CHECK_LIMIT", 5)?,
            duplicate_scan_thread_limit: numeric_var("DUPLICATE_SCAN_THREAD_LIMIT", 5)?,
            duplicate_scan_message_limit: numeric_var("DUPLICATE_SCAN_MESSAGE_LIMIT", 2000)?,
            google_api_key: require("GOOGLE_API_KEY")?,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            chunk_send_delay: Duration::from_millis(500),
            url_process_delay: Duration::from_secs(1),
            thread_scan_delay: Duration::from_millis(200),
        })
    }
}

fn require(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{name} environment variable not set"))
}

fn numeric_var(name: &str, default: u32) -> Result<u32, String> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e| format!("{name}: {e}")),
        Err(_) => Ok(default),
    }
}

fn csv_var(name: &str) -> Vec<String> {
    env::var(name)
        .map(|raw| {
            raw.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_id_list(raw: &str) -> Result<Vec<String>, String> {
    serde_json::from_str::<Vec<String>>(raw)
        .map_err(|e| format!("expected a JSON list of id strings (e.g. '[\"123\"]'): {e}"))
}

#[cfg(test)]
mod tests {
    use super::parse_id_list;

    #[test]
    fn id_list_parses_json_string_arrays() {
        let ids = parse_id_list(r#"["123", "456"]"#).expect("valid list");
        assert_eq!(ids, vec!["123".to_string(), "456".to_string()]);
    }

    #[test]
    fn id_list_rejects_bare_numbers() {
        assert!(parse_id_list("[123]").is_err());
    }
}
