use linkdigest::chunker::{MAX_MESSAGE_LEN, format_summary_entry, split_message};

/// Tests for the message chunking logic. Chunk lengths are measured in
/// characters, matching the platform limit.

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = split_message("hello world", MAX_MESSAGE_LEN);
    assert_eq!(chunks, vec!["hello world".to_string()]);
}

#[test]
fn every_chunk_respects_the_limit() {
    let text = (0..200)
        .map(|i| format!("line number {i} with a bit of padding text on it"))
        .collect::<Vec<_>>()
        .join("\n");
    let chunks = split_message(&text, 300);
    assert!(chunks.len() > 1, "long input should be split");
    for chunk in &chunks {
        assert!(
            char_len(chunk) <= 300,
            "chunk exceeded the limit at {} chars",
            char_len(chunk)
        );
    }
}

#[test]
fn rejoining_chunks_preserves_the_content() {
    let text = (0..80)
        .map(|i| format!("entry {i}: some repeated words to pad the line out"))
        .collect::<Vec<_>>()
        .join("\n");
    let chunks = split_message(&text, 250);

    // Only whitespace at the split points may differ.
    let squash = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
    assert_eq!(squash(&chunks.join("\n")), squash(&text));
}

#[test]
fn words_survive_splitting_intact() {
    let text = "word ".repeat(200);
    let chunks = split_message(text.trim_end(), 50);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(char_len(chunk) <= 50);
        for word in chunk.split_whitespace() {
            assert_eq!(word, "word", "a word was split across chunks: {word}");
        }
    }
}

#[test]
fn an_oversized_single_word_is_hard_split() {
    let word = "x".repeat(120);
    let chunks = split_message(&word, 50);
    assert_eq!(chunks.len(), 3);
    for chunk in &chunks {
        assert!(char_len(chunk) <= 50);
    }
    assert_eq!(chunks.concat(), word, "hard splitting must not lose characters");
}

#[test]
fn multibyte_text_is_measured_in_characters() {
    let text = "é".repeat(120);
    let chunks = split_message(&text, 50);
    for chunk in &chunks {
        assert!(char_len(chunk) <= 50);
    }
    assert_eq!(chunks.concat(), text);
}

#[test]
fn formatted_entry_fits_in_one_chunk_when_short() {
    let parts =
        format_summary_entry("https://example.com/a", "news", "A short summary.", MAX_MESSAGE_LEN);
    assert_eq!(parts.len(), 1);
    assert!(parts[0].starts_with("**URL (news):** https://example.com/a"));
    assert!(parts[0].contains("**Summary:**"));
    assert!(parts[0].ends_with("---"), "entry keeps its trailing separator");
}

#[test]
fn oversized_entry_repeats_the_url_line_on_every_part() {
    let summary = "word ".repeat(1200);
    let parts = format_summary_entry(
        "https://example.com/long",
        "news",
        summary.trim_end(),
        MAX_MESSAGE_LEN,
    );
    assert!(parts.len() > 1, "an oversized entry must be split");
    for part in &parts {
        assert!(
            char_len(part) <= MAX_MESSAGE_LEN,
            "part exceeded the limit at {} chars",
            char_len(part)
        );
        assert!(
            part.starts_with("**URL (news):** https://example.com/long"),
            "every part must be independently attributable"
        );
    }
    for part in &parts[..parts.len() - 1] {
        assert!(part.contains("...(continued)"));
    }
    assert!(
        !parts.last().expect("at least one part").contains("...(continued)"),
        "the final part is not a continuation"
    );
}
