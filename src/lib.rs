//! # Blogdex
//!
//! A Markdown blog pipeline. Authors write plain Markdown files; a build
//! step turns the content tree into a JSON article index plus a servable
//! mirror of the raw files, and a run-time client reads that output back
//! to list articles and render one on request.
//!
//! # Architecture: Build Once, Render on Request
//!
//! ```text
//! Build     content/articles/  →  public/blog/articles.json + public/blog/content/
//! Request   articles.json      →  slug lookup → raw Markdown → normalize → HTML
//! ```
//!
//! The build never renders HTML and the client never touches the source
//! tree. The only contract between them is the index document and the
//! served paths it contains, which keeps both halves testable on their own:
//! the build is a pure function from a directory to an output directory,
//! and the client runs against any [`source::ContentSource`], including an
//! in-memory one.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Build stage 1: walks the content tree and describes every article |
//! | [`generate`] | Build stage 2: mirrors the content tree and writes `articles.json` |
//! | [`client`] | Run-time listing and article retrieval over a shared, fetch-once index |
//! | [`normalize`] | Render-time cleanup: front matter, duplicate title, relative links |
//! | [`render`] | Markdown to HTML with highlighted code and diagram containers |
//! | [`source`] | Served-file access for the client: HTTP or a local web root |
//! | [`page`] | Standalone HTML preview document for one article |
//! | [`config`] | `blog.toml` loading, merging over stock defaults, validation |
//! | [`types`] | `ArticleSummary`, `ArticleIndex` and `Article` |
//! | [`frontmatter`] | `---` delimited `key: value` block splitting |
//! | [`text`] | Plain-text reduction of Markdown, word counts, reading time |
//! | [`naming`] | Slugs, filename titles and level-1 heading detection |
//! | [`metadata`] | Per-field resolution of an article's summary record |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Raw Markdown in the Mirror
//!
//! The mirror is a byte-identical copy of the source tree, front matter
//! included. Normalization happens when an article is requested, so images
//! and other files sitting next to an article are served from the same
//! relative location the author wrote them against.
//!
//! ## Fail the Build, Not the Reader
//!
//! Malformed front matter, unknown fence languages and highlighter errors
//! degrade to plain output. An unreadable source file or a duplicate slug
//! fails the build before any output is touched, since a partial index
//! would misrepresent the content set.
//!
//! ## Maud for Markup
//!
//! Every HTML fragment this crate produces itself (code block wrappers,
//! diagram containers, autolinks, the preview page) goes through
//! [Maud](https://maud.lambda.xyz/), so interpolated text is escaped by
//! construction.

pub mod client;
pub mod config;
pub mod frontmatter;
pub mod generate;
pub mod metadata;
pub mod naming;
pub mod normalize;
pub mod output;
pub mod page;
pub mod render;
pub mod scan;
pub mod source;
pub mod text;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
