//! Render-time cleanup of raw article Markdown.
//!
//! The mirror serves articles byte-for-byte, so before rendering the client:
//!
//! 1. Drops the front matter block
//! 2. Drops a leading `# Title` that repeats the resolved title, since the
//!    page already shows it
//! 3. Prefixes relative link and image targets with the article's own
//!    served directory
//!
//! ```text
//! markdownPath: /blog/content/posts/a.md
//! ![alt](img/pic.png)     →  ![alt](/blog/content/posts/img/pic.png)
//! [next](./b.md)          →  [next](/blog/content/posts/b.md)
//! [home](/), [top](#top)  →  unchanged
//! ```

use crate::frontmatter;
use crate::naming::{FenceTracker, heading_text};
use crate::types::ArticleSummary;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static LINK_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(!?\[[^\]]*\]\()([^)\s]+)([^)]*\))").expect("link pattern must compile")
});

static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("scheme pattern must compile"));

/// Apply every normalization step for `summary`'s article.
pub fn normalize(raw: &str, summary: &ArticleSummary) -> String {
    let body = frontmatter::strip(raw);
    let body = strip_leading_title(body, &summary.title);
    rewrite_relative_links(body, &summary.markdown_path)
}

/// Remove the first non-blank line when it is a level-1 heading matching
/// `title` (case-insensitive), along with the blank lines after it.
pub fn strip_leading_title<'a>(markdown: &'a str, title: &str) -> &'a str {
    let rest = skip_blank_lines(markdown);
    let Some((line, after)) = split_line(rest) else {
        return markdown;
    };
    match heading_text(line) {
        Some(text) if text.to_lowercase() == title.trim().to_lowercase() => {
            skip_blank_lines(after)
        }
        _ => markdown,
    }
}

/// Prefix relative link and image targets with the directory of
/// `markdown_path`. Lines inside fenced code are left alone.
pub fn rewrite_relative_links(markdown: &str, markdown_path: &str) -> String {
    let base = match markdown_path.rfind('/') {
        Some(idx) => &markdown_path[..=idx],
        None => "",
    };

    let mut out = String::with_capacity(markdown.len());
    let mut fences = FenceTracker::default();
    for line in markdown.split_inclusive('\n') {
        if fences.is_fenced(line) {
            out.push_str(line);
            continue;
        }

        let rewritten = LINK_TARGET.replace_all(line, |caps: &Captures| {
            let target = &caps[2];
            if is_absolute(target) {
                caps[0].to_string()
            } else {
                let target = target.strip_prefix("./").unwrap_or(target);
                format!("{}{}{}{}", &caps[1], base, target, &caps[3])
            }
        });
        out.push_str(&rewritten);
    }
    out
}

fn is_absolute(target: &str) -> bool {
    target.starts_with('/') || target.starts_with('#') || SCHEME.is_match(target)
}

fn skip_blank_lines(mut text: &str) -> &str {
    while let Some((line, after)) = split_line(text) {
        if !line.trim().is_empty() {
            break;
        }
        text = after;
    }
    text
}

fn split_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    Some(match text.find('\n') {
        Some(idx) => (text[..idx].trim_end_matches('\r'), &text[idx + 1..]),
        None => (text, ""),
    })
}
