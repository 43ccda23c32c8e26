//! Resolution of human-readable channel and category names to ids.

use crate::core::models::{Channel, ChannelType};

/// Text and announcement channels under the named category, minus
/// denylisted names. Empty when the category does not exist; that is a
/// configuration condition for the caller to log, not an error.
#[must_use]
pub fn channels_in_category(
    channels: &[Channel],
    category_name: &str,
    denylist: &[String],
) -> Vec<Channel> {
    let Some(category) = channels
        .iter()
        .find(|channel| channel.kind == ChannelType::Category && channel.name == category_name)
    else {
        return Vec::new();
    };

    channels
        .iter()
        .filter(|channel| {
            matches!(channel.kind, ChannelType::Text | ChannelType::Announcement)
        })
        .filter(|channel| channel.parent_id.as_deref() == Some(category.id.as_str()))
        .filter(|channel| !denylist.iter().any(|name| name == &channel.name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: &str, name: &str, kind: ChannelType, parent_id: Option<&str>) -> Channel {
        Channel {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            parent_id: parent_id.map(str::to_string),
        }
    }

    fn guild() -> Vec<Channel> {
        vec![
            channel("1", "BOT", ChannelType::Category, None),
            channel("2", "news", ChannelType::Text, Some("1")),
            channel("3", "papers", ChannelType::Text, Some("1")),
            channel("4", "updates", ChannelType::Announcement, Some("1")),
            channel("5", "general", ChannelType::Text, Some("9")),
            channel("6", "digest", ChannelType::Forum, Some("1")),
        ]
    }

    #[test]
    fn finds_text_and_announcement_children_of_the_category() {
        let found = channels_in_category(&guild(), "BOT", &[]);
        let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["news", "papers", "updates"]);
    }

    #[test]
    fn denylisted_names_are_excluded() {
        let found = channels_in_category(&guild(), "BOT", &["papers".to_string()]);
        assert!(found.iter().all(|c| c.name != "papers"));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn missing_category_yields_nothing() {
        assert!(channels_in_category(&guild(), "NOPE", &[]).is_empty());
    }
}
