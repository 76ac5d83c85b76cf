//! Shared types used by the build stage and the run-time client.
//!
//! [`ArticleSummary`] and [`ArticleIndex`] are serialized into
//! `articles.json` at build time and deserialized by the client, so the
//! field names on the wire are camelCase and must not drift.

use serde::{Deserialize, Serialize};

/// One entry of the article index, as persisted and listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    /// URL-safe identifier, from `slug:` metadata or the filename
    pub slug: String,
    /// From `title:` metadata, the first `# heading`, or the filename
    pub title: String,
    /// `YYYY-MM-DD`, from `date:` metadata or the file modification time
    pub date: String,
    /// From `summary:` metadata or the start of the plain-text body
    pub summary: String,
    /// Estimated reading time, never less than 1
    pub reading_minutes: u32,
    /// Absolute served path of the mirrored Markdown file
    pub markdown_path: String,
    /// Path relative to the content root, with forward slashes
    pub source_path: String,
}

/// The index document: summaries sorted by date, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleIndex {
    #[serde(default)]
    pub articles: Vec<ArticleSummary>,
}

/// A fetched and rendered article. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    /// Markdown after front matter, duplicate title, and link normalization
    pub markdown: String,
    /// Rendered HTML of `markdown`
    pub html: String,
}
