//! Splitting long text into platform-legal messages.
//!
//! The hard limit is measured in characters. Splitting prefers line
//! boundaries, then word boundaries, and hard-splits by character count
//! only when a single word alone exceeds the limit.

/// The platform's hard per-message character limit.
pub const MAX_MESSAGE_LEN: usize = 2000;

const CONTINUED_MARKER: &str = "\n...(continued)\n";
const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` into chunks of at most `limit` characters. Rejoining
/// the chunks reproduces the input up to whitespace at the split
/// points.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if char_len(text) <= limit {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let line_len = char_len(line);
        if line_len > limit {
            if current_len > 0 {
                chunks.push(current.trim_end().to_string());
                current.clear();
            }
            let mut pieces = split_line_by_words(line, limit);
            if let Some(last) = pieces.pop() {
                chunks.extend(pieces);
                current_len = char_len(&last) + 1;
                current = last;
                current.push('\n');
            } else {
                current_len = 0;
            }
        } else if current_len > 0 && current_len + line_len + 1 > limit {
            chunks.push(current.trim_end().to_string());
            current = String::from(line);
            current.push('\n');
            current_len = line_len + 1;
        } else {
            current.push_str(line);
            current.push('\n');
            current_len += line_len + 1;
        }
    }

    let tail = current.trim_end();
    if !tail.is_empty() {
        chunks.push(tail.to_string());
    }
    chunks
}

/// Accumulate words up to `limit` characters per part. A single word
/// longer than the limit is split by character count as a last resort.
fn split_line_by_words(line: &str, limit: usize) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    for word in line.split(' ') {
        let word_len = char_len(word);
        if word_len > limit {
            if buffer_len > 0 {
                parts.push(std::mem::take(&mut buffer));
            }
            let mut piece = String::new();
            let mut piece_len = 0usize;
            for ch in word.chars() {
                if piece_len == limit {
                    parts.push(std::mem::take(&mut piece));
                    piece_len = 0;
                }
                piece.push(ch);
                piece_len += 1;
            }
            buffer = piece;
            buffer_len = piece_len;
        } else if buffer_len > 0 && buffer_len + word_len + 1 > limit {
            parts.push(std::mem::take(&mut buffer));
            buffer = word.to_string();
            buffer_len = word_len;
        } else {
            if buffer_len > 0 {
                buffer.push(' ');
                buffer_len += 1;
            }
            buffer.push_str(word);
            buffer_len += word_len;
        }
    }

    if buffer_len > 0 {
        parts.push(buffer);
    }
    parts
}

/// One formatted summary entry, already chunked where necessary.
///
/// The usual shape is a single
/// `**URL (<label>):** <url>\n**Summary:**\n<summary>\n\n---\n\n`
/// message. When that alone exceeds the limit, the summary body is
/// split into character-bounded parts and every part re-prefixes the
/// URL line and carries a `...(continued)` marker, so each part is
/// independently a legal message even for body text with no newlines.
#[must_use]
pub fn format_summary_entry(
    url: &str,
    source_label: &str,
    summary: &str,
    limit: usize,
) -> Vec<String> {
    let url_line = format!("**URL ({source_label}):** {url}\n**Summary:**\n");
    let entry = format!("{url_line}{summary}{ENTRY_SEPARATOR}");
    if char_len(&entry) <= limit {
        return vec![entry.trim().to_string()];
    }

    // Reserve room for the continuation marker up front so no part can
    // come out over the limit.
    let overhead = char_len(&url_line) + char_len(CONTINUED_MARKER) + char_len(ENTRY_SEPARATOR);
    let body_len = limit.saturating_sub(overhead).max(1);

    let summary_chars: Vec<char> = summary.chars().collect();
    let total_parts = summary_chars.len().div_ceil(body_len);

    let mut parts: Vec<String> = Vec::new();
    for (index, window) in summary_chars.chunks(body_len).enumerate() {
        let body: String = window.iter().collect();
        let part = if index + 1 == total_parts {
            format!("{url_line}{body}\n{ENTRY_SEPARATOR}")
        } else {
            format!("{url_line}{body}{CONTINUED_MARKER}{ENTRY_SEPARATOR}")
        };
        parts.push(part.trim().to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_splitter_keeps_words_intact() {
        let line = "alpha beta gamma delta epsilon";
        let parts = split_line_by_words(line, 12);
        for part in &parts {
            assert!(char_len(part) <= 12, "part too long: {part:?}");
        }
        let rejoined = parts.join(" ");
        assert_eq!(rejoined, line);
    }

    #[test]
    fn word_splitter_hard_splits_an_oversized_word() {
        let word = "a".repeat(30);
        let parts = split_line_by_words(&word, 10);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|part| char_len(part) == 10));
        assert_eq!(parts.concat(), word);
    }

    #[test]
    fn word_splitter_handles_a_word_exactly_at_the_limit() {
        let line = format!("{} tail", "b".repeat(10));
        let parts = split_line_by_words(&line, 10);
        assert_eq!(parts, vec!["b".repeat(10), "tail".to_string()]);
    }
}
