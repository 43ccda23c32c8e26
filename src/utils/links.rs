//! URL extraction from chat messages.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::core::models::Message;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("url regex compiles"));

/// First URL in a text body, if any.
#[must_use]
pub fn first_url_in_text(text: &str) -> Option<String> {
    URL_RE.find(text).map(|found| found.as_str().to_string())
}

/// First URL carried by a message: the text body wins, then the first
/// embed that has one. A message with several links intentionally
/// yields only its first; messages here carry one candidate link each.
#[must_use]
pub fn first_url_in_message(message: &Message) -> Option<String> {
    first_url_in_text(&message.content)
        .or_else(|| message.embeds.iter().find_map(|embed| embed.url.clone()))
}

/// Whether the URL's host is `domain` or a subdomain of it. Unparseable
/// URLs fall back to substring containment.
#[must_use]
pub fn domain_matches(url: &str, domain: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .is_some_and(|host| host == domain || host.ends_with(&format!(".{domain}"))),
        Err(_) => url.contains(domain),
    }
}
