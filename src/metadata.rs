//! Article metadata resolution.
//!
//! Each [`ArticleSummary`] field is resolved independently from up to three
//! sources. The first non-empty value wins:
//!
//! - **Title**: `title:` front matter → first `# heading` → filename
//! - **Date**: `date:` front matter → file modification time (UTC)
//! - **Summary**: `summary:` front matter → start of the plain-text body
//! - **Slug**: `slug:` front matter → slugified filename
//!
//! Reading time is always derived from the plain-text body.

use crate::config::IndexConfig;
use crate::frontmatter;
use crate::naming::{first_heading, slugify, title_from_stem};
use crate::text::{estimate_reading_minutes, strip_markdown, truncate_chars};
use crate::types::ArticleSummary;
use chrono::{DateTime, Utc};
use std::path::{Component, Path};
use std::time::SystemTime;

/// Everything needed to describe one article besides its contents.
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    /// Path relative to the content root.
    pub relative_path: &'a Path,
    /// Modification time, used when no date is declared.
    pub modified: SystemTime,
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value.
///
/// ```text
/// title: resolve(&[meta_title, first_heading, filename_title])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Build the index entry for one article.
pub fn describe(
    file: SourceFile<'_>,
    raw: &str,
    url_prefix: &str,
    config: &IndexConfig,
) -> ArticleSummary {
    let doc = frontmatter::parse(raw);
    let stem = file
        .relative_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let plain = strip_markdown(doc.body);
    let source_path = to_url_path(file.relative_path);

    let filename_title = title_from_stem(&stem);
    let title = resolve(&[
        doc.get("title"),
        first_heading(doc.body),
        Some(filename_title.as_str()),
    ])
    .unwrap_or_else(|| stem.clone());

    let date = resolve(&[doc.get("date")]).unwrap_or_else(|| format_date(file.modified));

    let derived_summary = truncate_chars(&plain, config.summary_length);
    let summary = resolve(&[doc.get("summary"), Some(derived_summary)]).unwrap_or_default();

    let slug = resolve(&[doc.get("slug")]).unwrap_or_else(|| slugify(&stem));

    ArticleSummary {
        slug,
        title,
        date,
        summary,
        reading_minutes: estimate_reading_minutes(&plain, config.words_per_minute),
        markdown_path: format!("{}/{}", url_prefix.trim_end_matches('/'), source_path),
        source_path,
    }
}

/// Format a timestamp as a `YYYY-MM-DD` UTC calendar date.
pub fn format_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format("%Y-%m-%d").to_string()
}

/// Join path components with forward slashes regardless of platform.
fn to_url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
