//! Markdown to HTML rendering.
//!
//! Articles render with CommonMark plus tables, strikethrough, task lists
//! and autolinks. A single newline inside a paragraph is a soft break, not
//! a `<br>`.
//!
//! ## Fenced Code
//!
//! Fences are routed by their normalized language tag:
//!
//! | Fence tag              | Output                                              |
//! |------------------------|-----------------------------------------------------|
//! | (none)                 | `<pre><code>` with escaped text                     |
//! | `mermaid`              | `<div class="mermaid">` with escaped diagram source |
//! | known grammar          | `<pre><code class="language-x">` with token spans   |
//! | unknown grammar        | `<pre><code class="language-x">` with escaped text  |
//!
//! `xml`, `html` and `svg` normalize to `markup`; `shell`, `sh` and `zsh`
//! normalize to `bash`. Diagrams are drawn client-side after the HTML is
//! mounted; this module only marks them.
//!
//! Highlighting is class-based (`<span class="keyword control rust">`) so
//! a stylesheet decides colors and the same grammar always yields the same
//! classes.
//!
//! ## Sanitizing
//!
//! Raw HTML in an article passes through the parser untouched, so every
//! rendered fragment goes through an allow-list cleaner before it is
//! returned. Scripts, event handler attributes and `javascript:` URLs are
//! dropped; the classes on code, token spans and diagram containers are
//! kept.

use crate::config::RenderConfig;
use ammonia::Builder;
use maud::{PreEscaped, html};
use once_cell::sync::Lazy;
use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream, html as md_html,
};
use regex::Regex;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::warn;

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

static BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("url pattern must compile"));

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    builder
        .link_rel(None)
        .add_tags(["input"])
        .add_tag_attributes("code", ["class"])
        .add_tag_attributes("span", ["class"])
        .add_tag_attributes("div", ["class"])
        .add_tag_attributes("input", ["type", "checked", "disabled"]);
    builder
});

static DEFAULT_RENDERER: Lazy<MarkdownRenderer> =
    Lazy::new(|| MarkdownRenderer::new(&RenderConfig::default()));

/// Render with the default settings.
pub fn markdown_to_html(markdown: &str) -> String {
    DEFAULT_RENDERER.render(markdown)
}

/// Strip everything outside the article allow-list from an HTML fragment.
pub fn sanitize_html(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}

/// How a fenced block is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceKind {
    /// No language declared.
    Plain,
    /// A `mermaid` diagram for client-side rendering.
    Diagram,
    /// Code in a normalized language.
    Code(String),
}

impl FenceKind {
    /// Classify a fence from its info string (`rust`, `SH title="x"`, …).
    pub fn from_info(info: &str) -> Self {
        match normalize_fence_language(info) {
            None => FenceKind::Plain,
            Some(lang) if lang == "mermaid" => FenceKind::Diagram,
            Some(lang) => FenceKind::Code(lang),
        }
    }
}

/// Normalize the language tag of a fence info string.
///
/// Returns `None` when no language is declared.
pub fn normalize_fence_language(info: &str) -> Option<String> {
    let lang = info.split_whitespace().next()?.to_lowercase();
    let normalized = match lang.as_str() {
        "xml" | "html" | "svg" => "markup".to_string(),
        "shell" | "sh" | "zsh" => "bash".to_string(),
        _ => lang,
    };
    Some(normalized)
}

/// Converts normalized article Markdown into HTML.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    highlight: bool,
    autolink: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl MarkdownRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            highlight: config.highlight,
            autolink: config.autolink,
        }
    }

    pub fn render(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = TextMergeStream::new(Parser::new_ext(markdown, options));
        let events = self.rewrite_events(parser);

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        md_html::push_html(&mut out, events.into_iter());
        sanitize_html(&out)
    }

    /// Replace fenced code with pre-rendered HTML and link bare URLs.
    fn rewrite_events<'a>(&self, parser: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
        let mut events = Vec::new();
        let mut code: Option<(FenceKind, String)> = None;
        // Inside links and images text must stay text
        let mut link_depth = 0usize;

        for event in parser {
            if let Some((_, buf)) = code.as_mut() {
                match event {
                    Event::Text(text) => buf.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((kind, text)) = code.take() {
                            let html = self.render_code_block(&kind, &text);
                            events.push(Event::Html(html.into()));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let kind = match kind {
                        CodeBlockKind::Fenced(info) => FenceKind::from_info(&info),
                        CodeBlockKind::Indented => FenceKind::Plain,
                    };
                    code = Some((kind, String::new()));
                }
                Event::Start(tag @ (Tag::Link { .. } | Tag::Image { .. })) => {
                    link_depth += 1;
                    events.push(Event::Start(tag));
                }
                Event::End(end @ (TagEnd::Link | TagEnd::Image)) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(Event::End(end));
                }
                Event::Text(text) if self.autolink && link_depth == 0 => {
                    linkify(text, &mut events);
                }
                other => events.push(other),
            }
        }
        events
    }

    /// Render one fenced block.
    pub fn render_code_block(&self, kind: &FenceKind, text: &str) -> String {
        let markup = match kind {
            FenceKind::Plain => html! { pre { code { (text) } } },
            FenceKind::Diagram => html! { div.mermaid { (text) } },
            FenceKind::Code(lang) => {
                let class = format!("language-{lang}");
                match self.highlight(lang, text) {
                    Some(highlighted) => {
                        html! { pre { code class=(class) { (PreEscaped(highlighted)) } } }
                    }
                    None => html! { pre { code class=(class) { (text) } } },
                }
            }
        };
        let mut out = markup.into_string();
        out.push('\n');
        out
    }

    /// Token-classed HTML for `text`, or `None` when highlighting is off,
    /// no grammar matches, or the grammar fails on this input.
    fn highlight(&self, lang: &str, text: &str) -> Option<String> {
        if !self.highlight {
            return None;
        }
        let syntax = SYNTAXES.find_syntax_by_token(grammar_token(lang))?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
        for line in LinesWithEndings::from(text) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                warn!(language = lang, error = %e, "Highlighting failed; emitting plain code");
                return None;
            }
        }
        Some(generator.finalize())
    }
}

/// Grammar lookup token for a normalized language.
fn grammar_token(lang: &str) -> &str {
    match lang {
        "markup" => "html",
        other => other,
    }
}

/// Split `text` around bare URLs, emitting anchors for each.
fn linkify<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    if !BARE_URL.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for m in BARE_URL.find_iter(&text) {
        let url = trim_url_end(m.as_str());
        let start = m.start();
        let end = start + url.len();
        if start > last {
            events.push(Event::Text(text[last..start].to_string().into()));
        }
        let anchor = html! { a href=(url) { (url) } };
        events.push(Event::InlineHtml(anchor.into_string().into()));
        last = end;
    }
    if last < text.len() {
        events.push(Event::Text(text[last..].to_string().into()));
    }
}

/// Drop trailing sentence punctuation from a matched URL. A closing paren
/// is only dropped while it has no opening partner inside the URL.
fn trim_url_end(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '\'']);
        let unbalanced = trimmed.matches(')').count() > trimmed.matches('(').count();
        match trimmed.strip_suffix(')') {
            Some(rest) if unbalanced => url = rest,
            _ => return trimmed,
        }
    }
}
