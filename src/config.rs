//! Blog configuration module.
//!
//! Handles loading, validating, and merging `blog.toml`. Stock defaults are
//! the base layer; a user file only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_dir = "content/articles"  # Source Markdown tree
//! public_dir = "public"             # Served web root
//! base_path = "/blog"               # URL prefix of the blog output
//!
//! [index]
//! summary_length = 180              # Characters of derived summary
//! words_per_minute = 220            # Reading speed for reading time
//! allow_duplicate_slugs = false     # Reject duplicate slugs at build time
//!
//! [render]
//! highlight = true                  # Syntax-highlight fenced code
//! autolink = true                   # Turn bare URLs into links
//!
//! [client]
//! latest_count = 3                  # Default size of the "latest" listing
//! ```
//!
//! ## Derived Paths
//!
//! With the defaults above, a build writes:
//!
//! ```text
//! public/blog/
//! ├── articles.json        # Index document
//! └── content/             # Mirror of content/articles/
//! ```
//!
//! and every `markdownPath` starts with `/blog/content/`.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default name of the config file at the project root.
pub const CONFIG_FILENAME: &str = "blog.toml";

/// Name of the index document inside the output root.
pub const INDEX_FILENAME: &str = "articles.json";

/// Name of the content mirror inside the output root.
pub const MIRROR_DIRNAME: &str = "content";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Blog configuration loaded from `blog.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Directory holding the source Markdown articles.
    pub content_dir: PathBuf,
    /// Web root the site is served from.
    pub public_dir: PathBuf,
    /// URL prefix under which the index and mirror are served.
    pub base_path: String,
    /// Index building settings.
    pub index: IndexConfig,
    /// Markdown rendering settings.
    pub render: RenderConfig,
    /// Run-time client settings.
    pub client: ClientConfig,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/articles"),
            public_dir: PathBuf::from("public"),
            base_path: "/blog".to_string(),
            index: IndexConfig::default(),
            render: RenderConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl BlogConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index.summary_length == 0 {
            return Err(ConfigError::Validation(
                "index.summary_length must be greater than 0".into(),
            ));
        }
        if self.index.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "index.words_per_minute must be greater than 0".into(),
            ));
        }
        if !self.base_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "base_path must start with '/'".into(),
            ));
        }
        if self.base_path.len() > 1 && self.base_path.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_path must not end with '/'".into(),
            ));
        }
        Ok(())
    }

    /// Filesystem directory the blog output is written to.
    pub fn output_root(&self) -> PathBuf {
        let relative = self.base_path.trim_start_matches('/');
        if relative.is_empty() {
            self.public_dir.clone()
        } else {
            self.public_dir.join(relative)
        }
    }

    /// Filesystem path of the index document.
    pub fn index_file(&self) -> PathBuf {
        self.output_root().join(INDEX_FILENAME)
    }

    /// Filesystem directory of the content mirror.
    pub fn mirror_dir(&self) -> PathBuf {
        self.output_root().join(MIRROR_DIRNAME)
    }

    /// Served path of the index document, e.g. `/blog/articles.json`.
    pub fn index_url(&self) -> String {
        format!("{}/{}", self.base_prefix(), INDEX_FILENAME)
    }

    /// Served prefix of mirrored Markdown, e.g. `/blog/content`.
    pub fn content_url_prefix(&self) -> String {
        format!("{}/{}", self.base_prefix(), MIRROR_DIRNAME)
    }

    fn base_prefix(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }
}

/// Index building settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Maximum characters of a summary derived from the article body.
    pub summary_length: usize,
    /// Reading speed used to estimate reading minutes.
    pub words_per_minute: usize,
    /// Keep duplicate slugs (first match wins at lookup) instead of failing.
    pub allow_duplicate_slugs: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            summary_length: 180,
            words_per_minute: 220,
            allow_duplicate_slugs: false,
        }
    }
}

/// Markdown rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Syntax-highlight fenced code blocks that declare a known language.
    pub highlight: bool,
    /// Turn bare `http(s)://` URLs in text into links.
    pub autolink: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            autolink: true,
        }
    }
}

/// Run-time client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Default number of articles in the "latest" listing.
    pub latest_count: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { latest_count: 3 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BlogConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BlogConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BlogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when
/// the file does not exist.
pub fn load_config(path: &Path) -> Result<BlogConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `blog.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Blog Pipeline Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Directory holding the source Markdown articles. Nested folders are fine;
# images and other files next to an article are mirrored with it.
content_dir = "content/articles"

# Web root the site is served from.
public_dir = "public"

# URL prefix for blog output. The index is written to
# <public_dir><base_path>/articles.json and the content mirror to
# <public_dir><base_path>/content/.
base_path = "/blog"

# ---------------------------------------------------------------------------
# Index building
# ---------------------------------------------------------------------------
[index]
# Characters kept when a summary is derived from the article body.
summary_length = 180

# Reading speed used for the reading-time estimate.
words_per_minute = 220

# Two articles resolving to the same slug fail the build unless this is
# true. When allowed, lookups return the newest article with that slug.
allow_duplicate_slugs = false

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Syntax-highlight fenced code blocks with a known language.
highlight = true

# Turn bare http(s) URLs in text into links.
autolink = true

# ---------------------------------------------------------------------------
# Client
# ---------------------------------------------------------------------------
[client]
# Number of articles in the "latest" listing.
latest_count = 3
"##
}
