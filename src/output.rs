//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every article leads
//! with its positional index and title; slug, date and source path follow as
//! indented context lines, so the listing reads as a content inventory while
//! still tracing each entry back to its file.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Articles
//! 001 Shipping a Rust CLI
//!     Slug: shipping-a-rust-cli
//!     Date: 2024-06-01 (4 min)
//!     Source: 2024/shipping-a-cli.md
//! 002 Hello World
//!     Slug: hello-world
//!     Date: 2024-01-01 (1 min)
//!     Source: hello-world.md
//!
//! Indexed 2 articles, mirrored 3 files → public/blog/articles.json
//! ```
//!
//! ## List
//!
//! ```text
//! 2024-06-01  shipping-a-rust-cli  Shipping a Rust CLI
//! 2024-01-01  hello-world          Hello World
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::BuildReport;
use crate::types::ArticleSummary;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Article inventory (build, check)
// ============================================================================

/// Format the indexed articles as a numbered inventory.
pub fn format_article_inventory(articles: &[ArticleSummary]) -> Vec<String> {
    let mut lines = vec!["Articles".to_string()];
    if articles.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }
    for (i, article) in articles.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), article.title));
        lines.push(format!("{}Slug: {}", indent(1), article.slug));
        lines.push(format!(
            "{}Date: {} ({} min)",
            indent(1),
            article.date,
            article.reading_minutes
        ));
        lines.push(format!("{}Source: {}", indent(1), article.source_path));
    }
    lines
}

/// Format the outcome of a build.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = format_article_inventory(&report.index.articles);
    lines.push(String::new());

    let count = plural(report.index.articles.len(), "article");
    let summary = match &report.mirror_dir {
        Some(_) => format!(
            "Indexed {count}, mirrored {} → {}",
            plural(report.mirrored_files, "file"),
            report.index_path.display()
        ),
        None => format!(
            "No content directory; wrote empty index → {}",
            report.index_path.display()
        ),
    };
    lines.push(summary);
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{line}");
    }
}

/// Format a dry-run scan.
pub fn format_check_output(articles: &[ArticleSummary]) -> Vec<String> {
    let mut lines = format_article_inventory(articles);
    lines.push(String::new());
    lines.push(format!("Found {}", plural(articles.len(), "article")));
    lines
}

pub fn print_check_output(articles: &[ArticleSummary]) {
    for line in format_check_output(articles) {
        println!("{line}");
    }
}

// ============================================================================
// Client listing
// ============================================================================

/// One line per article: date, slug and title in aligned columns.
pub fn format_article_list(articles: &[ArticleSummary]) -> Vec<String> {
    let slug_width = articles
        .iter()
        .map(|a| a.slug.chars().count())
        .max()
        .unwrap_or(0);
    articles
        .iter()
        .map(|a| format!("{}  {:<slug_width$}  {}", a.date, a.slug, a.title))
        .collect()
}

pub fn print_article_list(articles: &[ArticleSummary]) {
    for line in format_article_list(articles) {
        println!("{line}");
    }
}
