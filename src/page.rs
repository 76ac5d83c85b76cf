//! Standalone HTML preview of a rendered article.
//!
//! Used by `blogdex show --page` to eyeball an article outside the site.
//! The document is intentionally bare: a heading, the byline, the rendered
//! body, and the diagram hook that turns `div.mermaid` blocks into SVG once
//! the page has loaded.

use crate::render::sanitize_html;
use crate::types::Article;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const MERMAID_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs";

const STYLE: &str = "body{max-width:42rem;margin:2rem auto;padding:0 1rem;font-family:system-ui,sans-serif;line-height:1.6}\
pre{overflow-x:auto;padding:1rem;background:#f5f5f5}\
img{max-width:100%}\
.byline{color:#666}";

/// Render `article` as a complete HTML document.
///
/// The body is cleaned again here since an `Article` can be built by hand.
pub fn render_article_page(article: &Article) -> Markup {
    let body = sanitize_html(&article.html);
    let content = html! {
        article {
            h1 { (article.summary.title) }
            p.byline {
                time datetime=(article.summary.date) { (article.summary.date) }
                " · " (reading_time(article.summary.reading_minutes))
            }
            (PreEscaped(&body))
        }
    };
    base_document(&article.summary.title, content, body.contains("class=\"mermaid\""))
}

fn base_document(title: &str, content: Markup, diagrams: bool) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                (content)
                @if diagrams {
                    script type="module" {
                        (PreEscaped(format!(
                            "import mermaid from '{MERMAID_SCRIPT}';mermaid.initialize({{startOnLoad:true}});"
                        )))
                    }
                }
            }
        }
    }
}

fn reading_time(minutes: u32) -> String {
    format!("{minutes} min read")
}
