//! Filename and heading conventions shared by the build and the client.
//!
//! An article's filename doubles as its fallback identity:
//! - `shipping-a-rust-cli.md` → slug `shipping-a-rust-cli`
//! - `Shipping_A_Rust_CLI.md` → slug `shipping-a-rust-cli`, title "Shipping A Rust CLI"
//!
//! Heading text is read the same way at build time (to resolve a title) and
//! at render time (to detect a duplicate title), so both go through
//! [`heading_text`].

/// Convert a name into a URL-safe slug.
///
/// - Lowercases ASCII letters
/// - Replaces every run of characters outside `[a-z0-9]` with one dash
/// - Strips leading and trailing dashes
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Display title derived from a filename stem: runs of `-` and `_` become
/// single spaces.
pub fn title_from_stem(stem: &str) -> String {
    stem.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of a level-1 ATX heading line, or `None` for any other line.
///
/// Accepts up to three spaces of indentation and drops an optional closing
/// `#` sequence: `# Hello #` → "Hello".
pub fn heading_text(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = line[indent..].strip_prefix('#')?;
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim();
    let without_closing = text.trim_end_matches('#');
    let text = if without_closing.is_empty() {
        ""
    } else if without_closing.ends_with([' ', '\t']) {
        without_closing.trim_end()
    } else {
        text
    };
    (!text.is_empty()).then_some(text)
}

/// The first level-1 heading in a Markdown body, outside fenced code.
pub fn first_heading(body: &str) -> Option<&str> {
    let mut fences = FenceTracker::default();
    body.lines()
        .filter(|line| !fences.is_fenced(line))
        .find_map(heading_text)
}

/// Follows fenced code blocks across consecutive lines.
///
/// A block opened with backticks is only closed by backticks, and likewise
/// for tildes.
#[derive(Debug, Default)]
pub struct FenceTracker {
    open: Option<char>,
}

impl FenceTracker {
    /// Feed the next line. True when the line belongs to a fenced block,
    /// delimiter lines included.
    pub fn is_fenced(&mut self, line: &str) -> bool {
        if let Some(marker) = fence_marker(line) {
            match self.open {
                None => self.open = Some(marker),
                Some(open) if open == marker => self.open = None,
                Some(_) => {}
            }
            return true;
        }
        self.open.is_some()
    }
}

/// The fence character when `line` opens or closes a fenced block.
fn fence_marker(line: &str) -> Option<char> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}
