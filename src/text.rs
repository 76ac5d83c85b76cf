//! Plain-text reduction of Markdown for summaries and word counts.
//!
//! The reduction is lossy: it only needs to read well in a listing card and
//! count words sensibly. Rules run in a fixed order because later patterns
//! assume earlier ones already removed their constructs (link labels must
//! survive after images are gone, emphasis markers are stripped only once
//! list bullets have been handled).

use once_cell::sync::Lazy;
use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("reduction pattern must compile"),
        replacement,
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        // Fenced code blocks
        rule(r"(?s)```.*?```", " "),
        // Inline code spans keep their text
        rule(r"`([^`]+)`", "${1}"),
        // An unterminated fence
        rule(r"`{3,}", " "),
        // Images
        rule(r"!\[[^\]]*\]\([^)]*\)", " "),
        // Links keep their label
        rule(r"\[([^\]]*)\]\([^)]*\)", "${1}"),
        rule(r"(?m)^#{1,6}\s+", ""),
        rule(r"(?m)^>\s?", ""),
        rule(r"(?m)^[-*+]\s+", ""),
        rule(r"(?m)^\d+\.\s+", ""),
        rule(r"[*_~]", ""),
        rule(r"\n+", " "),
        rule(r"\s+", " "),
    ]
});

/// Reduce Markdown to a single line of readable plain text.
pub fn strip_markdown(markdown: &str) -> String {
    let mut text = markdown.to_string();
    for rule in RULES.iter() {
        text = rule
            .pattern
            .replace_all(&text, rule.replacement)
            .into_owned();
    }
    text.trim().to_string()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Reading time in whole minutes, rounded to nearest and never below 1.
pub fn estimate_reading_minutes(text: &str, words_per_minute: usize) -> u32 {
    let wpm = words_per_minute.max(1) as f64;
    let minutes = (word_count(text) as f64 / wpm).round() as u32;
    minutes.max(1)
}

/// Keep the first `max_chars` characters, then trim.
///
/// Counts characters rather than bytes so multi-byte text is never split
/// inside a character. Words may be cut; no ellipsis is added.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    let end = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    text[..end].trim()
}
