//! Shared test utilities for the blogdex test suite.
//!
//! Builds article trees in temp directories and provides lookup helpers
//! over scan results.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_article_dated(tmp.path(), "2024/hello.md", "# Hello", "2024-06-01");
//!
//! let index = scan(tmp.path(), "/blog/content", &IndexConfig::default()).unwrap();
//! assert_eq!(find_article(&index, "hello").date, "2024-06-01");
//! ```

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::types::{ArticleIndex, ArticleSummary};

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_article(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Write an article and set its modification time to noon UTC on `date`.
pub fn write_article_dated(root: &Path, relative: &str, content: &str, date: &str) -> PathBuf {
    let path = write_article(root, relative, content);
    set_modified(&path, date);
    path
}

/// Set a file's modification time to noon UTC on `date` (`YYYY-MM-DD`).
pub fn set_modified(path: &Path, date: &str) {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap_or_else(|e| panic!("bad fixture date '{date}': {e}"));
    let noon = day.and_hms_opt(12, 0, 0).unwrap().and_utc().timestamp();
    let time = SystemTime::UNIX_EPOCH + Duration::from_secs(noon as u64);
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

// =========================================================================
// Index lookups: panic with a clear message on miss
// =========================================================================

/// Find an article by slug. Panics if not found.
pub fn find_article<'a>(index: &'a ArticleIndex, slug: &str) -> &'a ArticleSummary {
    index
        .articles
        .iter()
        .find(|a| a.slug == slug)
        .unwrap_or_else(|| {
            let available = slugs(index);
            panic!("article '{slug}' not found. Available: {available:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All slugs in index order.
pub fn slugs(index: &ArticleIndex) -> Vec<&str> {
    index.articles.iter().map(|a| a.slug.as_str()).collect()
}

/// All dates in index order.
pub fn dates(index: &ArticleIndex) -> Vec<&str> {
    index.articles.iter().map(|a| a.date.as_str()).collect()
}

/// All source paths in index order.
pub fn source_paths(index: &ArticleIndex) -> Vec<&str> {
    index
        .articles
        .iter()
        .map(|a| a.source_path.as_str())
        .collect()
}

/// A summary with the given slug and title, pointing at `markdown_path`.
pub fn summary(slug: &str, title: &str, markdown_path: &str) -> ArticleSummary {
    ArticleSummary {
        slug: slug.to_string(),
        title: title.to_string(),
        date: "2024-06-01".to_string(),
        summary: String::new(),
        reading_minutes: 1,
        markdown_path: markdown_path.to_string(),
        source_path: markdown_path
            .rsplit_once("/content/")
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_default(),
    }
}
