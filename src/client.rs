//! Run-time article client.
//!
//! One [`BlogClient`] per process serves every listing and article request.
//! The index is fetched at most once: the first caller starts the fetch and
//! every caller, concurrent or later, awaits the same shared result. A
//! failed fetch is replayed to all of them and never retried; content is
//! immutable per deployment, so a successful result is never refetched
//! either.
//!
//! ```text
//! list_articles() ─┐
//! list_latest(n) ──┼─▶ shared index fetch ──▶ Arc<Vec<ArticleSummary>>
//! get_article(s) ──┘                                  │
//!                     fetch markdownPath ◀── first slug match
//!                            │
//!                      normalize → render ──▶ Article
//! ```
//!
//! Article fetches are independent and uncached.

use crate::config::BlogConfig;
use crate::normalize::normalize;
use crate::render::MarkdownRenderer;
use crate::source::{ContentSource, SourceError};
use crate::types::{Article, ArticleIndex, ArticleSummary};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("Failed to fetch {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: Arc<SourceError>,
    },
    #[error("Invalid article index: {0}")]
    InvalidIndex(#[source] Arc<serde_json::Error>),
}

/// The shared outcome of the index fetch.
pub type IndexResult = Result<Arc<Vec<ArticleSummary>>, ClientError>;

#[derive(Clone)]
pub struct BlogClient {
    source: Arc<dyn ContentSource>,
    renderer: Arc<MarkdownRenderer>,
    index: Shared<BoxFuture<'static, IndexResult>>,
}

impl BlogClient {
    /// Create a client reading the index from `index_url` on `source`.
    /// Nothing is fetched until the first request.
    pub fn new(
        source: Arc<dyn ContentSource>,
        index_url: impl Into<String>,
        renderer: MarkdownRenderer,
    ) -> Self {
        let index_url = index_url.into();
        let index_source = Arc::clone(&source);
        let index = async move { fetch_index(index_source.as_ref(), &index_url).await }
            .boxed()
            .shared();

        Self {
            source,
            renderer: Arc::new(renderer),
            index,
        }
    }

    /// Client for the blog described by `config`, served from `source`.
    pub fn from_config(config: &BlogConfig, source: Arc<dyn ContentSource>) -> Self {
        Self::new(
            source,
            config.index_url(),
            MarkdownRenderer::new(&config.render),
        )
    }

    /// Every summary, newest first.
    pub async fn list_articles(&self) -> IndexResult {
        self.index.clone().await
    }

    /// The first `n` summaries.
    pub async fn list_latest(&self, n: usize) -> Result<Vec<ArticleSummary>, ClientError> {
        let articles = self.list_articles().await?;
        Ok(articles.iter().take(n).cloned().collect())
    }

    /// Fetch, normalize and render the article with `slug`.
    ///
    /// Returns `Ok(None)` when no article has that slug. With duplicate
    /// slugs the first (newest) entry wins.
    pub async fn get_article(&self, slug: &str) -> Result<Option<Article>, ClientError> {
        let articles = self.list_articles().await?;
        let Some(summary) = articles.iter().find(|a| a.slug == slug).cloned() else {
            debug!(slug, "No article with slug");
            return Ok(None);
        };

        debug!(slug, path = %summary.markdown_path, "Fetching article");
        let raw = self
            .source
            .fetch_text(&summary.markdown_path)
            .await
            .map_err(|e| ClientError::Fetch {
                path: summary.markdown_path.clone(),
                source: Arc::new(e),
            })?;

        let markdown = normalize(&raw, &summary);
        let html = self.renderer.render(&markdown);
        Ok(Some(Article {
            summary,
            markdown,
            html,
        }))
    }
}

async fn fetch_index(source: &dyn ContentSource, index_url: &str) -> IndexResult {
    debug!(url = index_url, "Fetching article index");
    let result = match source.fetch_text(index_url).await {
        Ok(text) => parse_index(&text),
        Err(e) => Err(ClientError::Fetch {
            path: index_url.to_string(),
            source: Arc::new(e),
        }),
    };
    match &result {
        Ok(articles) => debug!(count = articles.len(), "Article index loaded"),
        Err(e) => warn!(error = %e, "Article index unavailable"),
    }
    result
}

fn parse_index(text: &str) -> IndexResult {
    let index: ArticleIndex =
        serde_json::from_str(text).map_err(|e| ClientError::InvalidIndex(Arc::new(e)))?;
    Ok(Arc::new(index.articles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::summary;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const INDEX_URL: &str = "/blog/articles.json";

    /// In-memory served files that records every request.
    #[derive(Default)]
    struct MockSource {
        files: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MockSource {
        fn with(mut self, path: &str, text: &str) -> Self {
            self.files.insert(path.to_string(), text.to_string());
            self
        }

        fn with_index(self, articles: &[ArticleSummary]) -> Self {
            let index = ArticleIndex {
                articles: articles.to_vec(),
            };
            self.with(INDEX_URL, &serde_json::to_string(&index).unwrap())
        }

        fn request_count(&self, path: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|p| *p == path)
                .count()
        }
    }

    #[async_trait]
    impl ContentSource for MockSource {
        async fn fetch_text(&self, path: &str) -> Result<String, SourceError> {
            self.requests.lock().unwrap().push(path.to_string());
            // Give concurrent callers a chance to pile up on the fetch
            tokio::task::yield_now().await;
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| SourceError::InvalidPath(path.to_string()))
        }
    }

    fn client_for(source: &Arc<MockSource>) -> BlogClient {
        let dyn_source: Arc<dyn ContentSource> = source.clone();
        BlogClient::new(dyn_source, INDEX_URL, MarkdownRenderer::default())
    }

    fn sample_articles() -> Vec<ArticleSummary> {
        vec![
            summary("newest", "Newest", "/blog/content/newest.md"),
            summary("middle", "Middle", "/blog/content/posts/middle.md"),
            summary("oldest", "Oldest", "/blog/content/oldest.md"),
        ]
    }

    // =========================================================================
    // Index caching
    // =========================================================================

    #[tokio::test]
    async fn concurrent_index_requests_fetch_once() {
        let source = Arc::new(MockSource::default().with_index(&sample_articles()));
        let client = client_for(&source);

        let (a, b) = tokio::join!(client.list_articles(), client.list_articles());

        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.request_count(INDEX_URL), 1);
    }

    #[tokio::test]
    async fn index_not_refetched_after_success() {
        let source = Arc::new(MockSource::default().with_index(&sample_articles()));
        let client = client_for(&source);

        client.list_articles().await.unwrap();
        client.list_latest(1).await.unwrap();
        client.get_article("missing").await.unwrap();

        assert_eq!(source.request_count(INDEX_URL), 1);
    }

    #[tokio::test]
    async fn cloned_clients_share_the_index() {
        let source = Arc::new(MockSource::default().with_index(&sample_articles()));
        let client = client_for(&source);
        let other = client.clone();

        let (a, b) = tokio::join!(client.list_articles(), other.list_articles());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(source.request_count(INDEX_URL), 1);
    }

    #[tokio::test]
    async fn nothing_fetched_before_first_request() {
        let source = Arc::new(MockSource::default().with_index(&sample_articles()));
        let _client = client_for(&source);
        assert_eq!(source.request_count(INDEX_URL), 0);
    }

    #[tokio::test]
    async fn fetch_failure_reaches_every_caller() {
        let source = Arc::new(MockSource::default());
        let client = client_for(&source);

        let (a, b) = tokio::join!(client.list_articles(), client.get_article("x"));

        assert!(matches!(a, Err(ClientError::Fetch { ref path, .. }) if path == INDEX_URL));
        assert!(matches!(b, Err(ClientError::Fetch { .. })));
        // A later caller sees the same failure, without a retry
        assert!(client.list_articles().await.is_err());
        assert_eq!(source.request_count(INDEX_URL), 1);
    }

    #[tokio::test]
    async fn invalid_index_is_error() {
        let source = Arc::new(MockSource::default().with(INDEX_URL, "not json"));
        let client = client_for(&source);
        assert!(matches!(
            client.list_articles().await,
            Err(ClientError::InvalidIndex(_))
        ));
    }

    #[tokio::test]
    async fn index_without_articles_key_is_empty() {
        let source = Arc::new(MockSource::default().with(INDEX_URL, "{}"));
        let client = client_for(&source);
        assert!(client.list_articles().await.unwrap().is_empty());
    }

    // =========================================================================
    // Listing
    // =========================================================================

    #[tokio::test]
    async fn list_latest_takes_prefix() {
        let source = Arc::new(MockSource::default().with_index(&sample_articles()));
        let client = client_for(&source);

        let latest = client.list_latest(2).await.unwrap();
        let slugs: Vec<_> = latest.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newest", "middle"]);

        assert_eq!(client.list_latest(10).await.unwrap().len(), 3);
        assert!(client.list_latest(0).await.unwrap().is_empty());
    }

    // =========================================================================
    // Articles
    // =========================================================================

    #[tokio::test]
    async fn get_article_normalizes_and_renders() {
        let source = Arc::new(
            MockSource::default()
                .with_index(&sample_articles())
                .with(
                    "/blog/content/posts/middle.md",
                    "---\ntitle: Middle\n---\n# Middle\n\nSee ![pic](img/p.png).\n",
                ),
        );
        let client = client_for(&source);

        let article = client.get_article("middle").await.unwrap().unwrap();

        assert_eq!(article.summary.slug, "middle");
        assert_eq!(
            article.markdown,
            "See ![pic](/blog/content/posts/img/p.png).\n"
        );
        assert_eq!(
            article.html,
            "<p>See <img src=\"/blog/content/posts/img/p.png\" alt=\"pic\">.</p>\n"
        );
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let source = Arc::new(MockSource::default().with_index(&sample_articles()));
        let client = client_for(&source);
        assert_eq!(client.get_article("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_slug_first_match_wins() {
        let mut articles = sample_articles();
        articles.push(summary("newest", "Shadowed", "/blog/content/shadowed.md"));
        let source = Arc::new(
            MockSource::default()
                .with_index(&articles)
                .with("/blog/content/newest.md", "Fresh.")
                .with("/blog/content/shadowed.md", "Stale."),
        );
        let client = client_for(&source);

        let article = client.get_article("newest").await.unwrap().unwrap();
        assert_eq!(article.summary.title, "Newest");
        assert_eq!(article.markdown, "Fresh.");
        assert_eq!(source.request_count("/blog/content/shadowed.md"), 0);
    }

    #[tokio::test]
    async fn missing_article_file_is_fetch_error() {
        let source = Arc::new(MockSource::default().with_index(&sample_articles()));
        let client = client_for(&source);

        match client.get_article("oldest").await {
            Err(ClientError::Fetch { path, .. }) => assert_eq!(path, "/blog/content/oldest.md"),
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn article_fetches_are_not_cached() {
        let source = Arc::new(
            MockSource::default()
                .with_index(&sample_articles())
                .with("/blog/content/newest.md", "Body."),
        );
        let client = client_for(&source);

        client.get_article("newest").await.unwrap();
        client.get_article("newest").await.unwrap();
        assert_eq!(source.request_count("/blog/content/newest.md"), 2);
    }
}
