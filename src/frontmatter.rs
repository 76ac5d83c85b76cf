//! Front matter splitting.
//!
//! Articles may open with a block of `key: value` lines fenced by `---`:
//!
//! ```markdown
//! ---
//! title: "Shipping a Rust CLI"
//! date: 2024-06-01
//! ---
//! # Shipping a Rust CLI
//! ```
//!
//! The block is deliberately not YAML. Each line is split on its first
//! colon, both sides are trimmed, and a value wrapped in double quotes loses
//! one quote on each side. Lines without a colon are skipped. A document
//! without an opening delimiter, or with no closing one, is all body and has
//! no metadata; this never fails.

use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// A document split into its metadata and body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrontMatter<'a> {
    /// Keys in the block, in sorted order. A repeated key keeps its last value.
    pub meta: BTreeMap<String, String>,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
}

impl FrontMatter<'_> {
    /// Look up a metadata value by exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }
}

/// Split `raw` into front matter and body.
pub fn parse(raw: &str) -> FrontMatter<'_> {
    match split_block(raw) {
        Some((head, body)) => FrontMatter {
            meta: parse_block(head),
            body,
        },
        None => FrontMatter {
            meta: BTreeMap::new(),
            body: raw,
        },
    }
}

/// Remove a leading front matter block, discarding its metadata.
pub fn strip(raw: &str) -> &str {
    split_block(raw).map(|(_, body)| body).unwrap_or(raw)
}

/// Locate the delimited block. Returns `(block, body)`.
fn split_block(raw: &str) -> Option<(&str, &str)> {
    let (first, rest) = next_line(raw)?;
    if !is_delimiter(first) {
        return None;
    }

    let mut offset = 0;
    let mut remaining = rest;
    while let Some((line, after)) = next_line(remaining) {
        if is_delimiter(line) {
            return Some((&rest[..offset], after));
        }
        offset += remaining.len() - after.len();
        remaining = after;
    }
    None
}

/// Split off the first line. The returned line excludes its terminator;
/// `None` once the input is exhausted.
fn next_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(idx) => Some((&text[..idx], &text[idx + 1..])),
        None => Some((text, "")),
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches('\r') == DELIMITER
}

fn parse_block(block: &str) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::new();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        meta.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    meta
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
