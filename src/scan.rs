//! Content scanning and index construction.
//!
//! Stage 1 of the build. Walks the content root, describes every Markdown
//! file, and produces the [`ArticleIndex`] the generate stage writes out.
//!
//! ## Directory Structure
//!
//! Any nesting depth works. Non-Markdown files are not indexed but are
//! mirrored alongside the articles that reference them:
//!
//! ```text
//! content/articles/
//! ├── hello-world.md               # slug: hello-world
//! ├── 2024/
//! │   ├── shipping-a-cli.md        # slug: shipping-a-cli
//! │   └── img/
//! │       └── terminal.png         # referenced as img/terminal.png
//! └── drafts/
//!     └── NOTES.MD                 # extension match is case-insensitive
//! ```
//!
//! ## Ordering
//!
//! Entries are visited sorted by file name, then the index is stably sorted
//! by `date` descending. `YYYY-MM-DD` strings compare correctly as plain
//! strings, so articles sharing a date keep their traversal order.
//!
//! ## Validation
//!
//! Two articles resolving to the same slug fail the scan with
//! [`ScanError::DuplicateSlug`], unless `index.allow_duplicate_slugs` is set.
//! In that case the first (newest) entry shadows the rest at lookup time.

use crate::config::IndexConfig;
use crate::metadata::{self, SourceFile};
use crate::types::{ArticleIndex, ArticleSummary};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Duplicate slug '{slug}' in {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },
}

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Scan `root` and build the sorted article index.
///
/// `url_prefix` is the served path the content mirror lives under; each
/// entry's `markdownPath` is `<url_prefix>/<sourcePath>`.
pub fn scan(root: &Path, url_prefix: &str, config: &IndexConfig) -> Result<ArticleIndex, ScanError> {
    let files = find_markdown_files(root)?;

    let mut articles = files
        .par_iter()
        .map(|path| describe_file(root, path, url_prefix, config))
        .collect::<Result<Vec<_>, _>>()?;

    articles.sort_by(|a, b| b.date.cmp(&a.date));

    check_duplicate_slugs(&articles, config.allow_duplicate_slugs)?;

    Ok(ArticleIndex { articles })
}

/// Every Markdown file under `root`, in sorted traversal order.
///
/// Symlinks are followed, so linked files and directories are indexed under
/// the link's own path. A link cycle is a walk error.
pub fn find_markdown_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|m| ext.eq_ignore_ascii_case(m))
        })
        .unwrap_or(false)
}

fn describe_file(
    root: &Path,
    path: &Path,
    url_prefix: &str,
    config: &IndexConfig,
) -> Result<ArticleSummary, ScanError> {
    let io_err = |source: std::io::Error| ScanError::Io {
        path: path.to_path_buf(),
        source,
    };
    let raw = fs::read_to_string(path).map_err(io_err)?;
    let modified = fs::metadata(path).and_then(|m| m.modified()).map_err(io_err)?;
    let relative_path = path.strip_prefix(root).unwrap_or(path);

    let summary = metadata::describe(
        SourceFile {
            relative_path,
            modified,
        },
        &raw,
        url_prefix,
        config,
    );
    debug!(slug = %summary.slug, date = %summary.date, source = %summary.source_path, "Described article");
    Ok(summary)
}

fn check_duplicate_slugs(articles: &[ArticleSummary], allow: bool) -> Result<(), ScanError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for article in articles {
        if let Some(first) = seen.get(article.slug.as_str()) {
            if !allow {
                return Err(ScanError::DuplicateSlug {
                    slug: article.slug.clone(),
                    first: first.to_string(),
                    second: article.source_path.clone(),
                });
            }
            warn!(
                slug = %article.slug,
                kept = %first,
                shadowed = %article.source_path,
                "Duplicate slug; lookups will return the first entry"
            );
        } else {
            seen.insert(&article.slug, &article.source_path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn scan_default(root: &Path) -> Result<ArticleIndex, ScanError> {
        scan(root, "/blog/content", &IndexConfig::default())
    }

    #[test]
    fn finds_nested_markdown_files() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "top.md", "# Top");
        write_article(tmp.path(), "a/b/c/deep.md", "# Deep");
        write_article(tmp.path(), "a/notes.txt", "not markdown");

        let index = scan_default(tmp.path()).unwrap();
        let mut sources = source_paths(&index);
        sources.sort();
        assert_eq!(sources, vec!["a/b/c/deep.md", "top.md"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "UPPER.MD", "# Upper");
        write_article(tmp.path(), "long.markdown", "# Long");
        write_article(tmp.path(), "mixed.Md", "# Mixed");

        let index = scan_default(tmp.path()).unwrap();
        assert_eq!(index.articles.len(), 3);
        assert!(find_article(&index, "upper").markdown_path.ends_with("/UPPER.MD"));
    }

    #[test]
    fn directory_named_like_markdown_is_skipped() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("folder.md")).unwrap();
        write_article(tmp.path(), "folder.md/inner.md", "# Inner");

        let index = scan_default(tmp.path()).unwrap();
        assert_eq!(slugs(&index), vec!["inner"]);
    }

    #[cfg(unix)]
    #[test]
    fn markdown_inside_symlinked_directory_is_indexed() {
        let tmp = TempDir::new().unwrap();
        let shared = TempDir::new().unwrap();
        write_article(shared.path(), "linked.md", "# Linked");
        write_article(tmp.path(), "own.md", "# Own");
        std::os::unix::fs::symlink(shared.path(), tmp.path().join("series")).unwrap();

        let index = scan_default(tmp.path()).unwrap();
        let mut sources = source_paths(&index);
        sources.sort();
        assert_eq!(sources, vec!["own.md", "series/linked.md"]);
        assert_eq!(
            find_article(&index, "linked").markdown_path,
            "/blog/content/series/linked.md"
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycle_is_walk_error() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "a/post.md", "# Post");
        std::os::unix::fs::symlink(tmp.path(), tmp.path().join("a/loop")).unwrap();

        assert!(matches!(scan_default(tmp.path()), Err(ScanError::Walk(_))));
    }

    #[test]
    fn sorted_by_date_descending() {
        let tmp = TempDir::new().unwrap();
        write_article_dated(tmp.path(), "january.md", "# January", "2024-01-01");
        write_article_dated(tmp.path(), "june.md", "# June", "2024-06-01");
        write_article(
            tmp.path(),
            "declared.md",
            "---\ndate: 2023-01-01\n---\n# Declared",
        );

        let index = scan_default(tmp.path()).unwrap();
        assert_eq!(dates(&index), vec!["2024-06-01", "2024-01-01", "2023-01-01"]);
        assert_eq!(slugs(&index), vec!["june", "january", "declared"]);
    }

    #[test]
    fn equal_dates_keep_traversal_order() {
        let tmp = TempDir::new().unwrap();
        for name in ["c.md", "a.md", "b.md"] {
            write_article(tmp.path(), name, "---\ndate: 2024-03-03\n---\n");
        }

        let index = scan_default(tmp.path()).unwrap();
        assert_eq!(slugs(&index), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_root_yields_empty_index() {
        let tmp = TempDir::new().unwrap();
        let index = scan_default(tmp.path()).unwrap();
        assert!(index.articles.is_empty());
    }

    #[test]
    fn duplicate_slug_is_error() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "one/post.md", "# One");
        write_article(tmp.path(), "two/post.md", "# Two");

        let result = scan_default(tmp.path());
        match result {
            Err(ScanError::DuplicateSlug { slug, first, second }) => {
                assert_eq!(slug, "post");
                assert_eq!(first, "one/post.md");
                assert_eq!(second, "two/post.md");
            }
            other => panic!("expected duplicate slug error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_declared_slug_is_error() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "a.md", "---\nslug: same\n---\n");
        write_article(tmp.path(), "b.md", "---\nslug: same\n---\n");

        assert!(matches!(
            scan_default(tmp.path()),
            Err(ScanError::DuplicateSlug { .. })
        ));
    }

    #[test]
    fn duplicate_slugs_allowed_when_configured() {
        let tmp = TempDir::new().unwrap();
        write_article_dated(tmp.path(), "old/post.md", "# Old", "2024-01-01");
        write_article_dated(tmp.path(), "new/post.md", "# New", "2024-06-01");

        let config = IndexConfig {
            allow_duplicate_slugs: true,
            ..IndexConfig::default()
        };
        let index = scan(tmp.path(), "/blog/content", &config).unwrap();
        assert_eq!(index.articles.len(), 2);
        assert_eq!(find_article(&index, "post").title, "New");
    }

    #[test]
    fn unreadable_file_is_error() {
        let tmp = TempDir::new().unwrap();
        // Invalid UTF-8 cannot be read as a string
        std::fs::write(tmp.path().join("binary.md"), [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(
            scan_default(tmp.path()),
            Err(ScanError::Io { .. })
        ));
    }

    #[test]
    fn missing_root_is_walk_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan_default(&tmp.path().join("nope"));
        assert!(matches!(result, Err(ScanError::Walk(_))));
    }

    #[test]
    fn markdown_paths_use_prefix() {
        let tmp = TempDir::new().unwrap();
        write_article(tmp.path(), "posts/a.md", "# A");

        let index = scan(tmp.path(), "/writing/content/", &IndexConfig::default()).unwrap();
        assert_eq!(
            index.articles[0].markdown_path,
            "/writing/content/posts/a.md"
        );
    }
}
