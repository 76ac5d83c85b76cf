//! Where the run-time client reads served files from.
//!
//! Paths handed to a [`ContentSource`] are *served* paths, exactly as they
//! appear in the index (`/blog/articles.json`, `/blog/content/posts/a.md`).
//! [`HttpSource`] resolves them against a live site; [`DirSource`] maps them
//! onto a built web root on disk.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid served path: {0}")]
    InvalidPath(String),
    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// A read-only view of the served site.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the text of the file served at `path`.
    async fn fetch_text(&self, path: &str) -> Result<String, SourceError>;
}

/// Reads from a live site over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base: Url::parse(base_url)?,
        })
    }

    /// Absolute URL for a served path. A leading `/` resolves from the
    /// site root, as a browser would.
    pub fn resolve(&self, path: &str) -> Result<Url, SourceError> {
        Ok(self.base.join(path)?)
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn fetch_text(&self, path: &str) -> Result<String, SourceError> {
        let url = self.resolve(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Reads from a built web root on disk, such as the `public_dir` a build
/// just wrote.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a served path. Rejects anything that would climb
    /// out of the root.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(SourceError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ContentSource for DirSource {
    async fn fetch_text(&self, path: &str) -> Result<String, SourceError> {
        let file = self.resolve(path)?;
        debug!(path = %file.display(), "Reading served file");
        tokio::fs::read_to_string(&file)
            .await
            .map_err(|source| SourceError::Io { path: file, source })
    }
}
