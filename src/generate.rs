//! Index and content mirror generation.
//!
//! Stage 2 of the build. Takes the content root, runs the scan, and writes
//! the servable blog output.
//!
//! ## Output Structure
//!
//! ```text
//! public/blog/
//! ├── articles.json              # { "articles": [...] }, pretty-printed
//! └── content/                   # byte-identical copy of content/articles/
//!     ├── hello-world.md         # front matter included, served as-is
//!     └── 2024/
//!         ├── shipping-a-cli.md
//!         └── img/terminal.png
//! ```
//!
//! ## Ordering
//!
//! 1. Scan and describe every article (fails before touching the output)
//! 2. Remove the previous mirror entirely, so deleted sources leave no orphans
//! 3. Copy the content tree into the mirror
//! 4. Write the index to a temporary sibling and rename it into place
//!
//! A missing content root is not an error: the index is written with an
//! empty article list and no mirror is produced.

use crate::config::BlogConfig;
use crate::scan::{self, ScanError};
use crate::types::ArticleIndex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T, GenerateError>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, GenerateError> {
        self.map_err(|source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// What a build produced.
#[derive(Debug)]
pub struct BuildReport {
    /// The index as written.
    pub index: ArticleIndex,
    /// Filesystem path of the written index.
    pub index_path: PathBuf,
    /// Mirror directory, `None` when there was no content root.
    pub mirror_dir: Option<PathBuf>,
    /// Number of files copied into the mirror.
    pub mirrored_files: usize,
}

/// Run the full build: scan, mirror, write index.
pub fn generate(config: &BlogConfig) -> Result<BuildReport, GenerateError> {
    let output_root = config.output_root();
    let index_path = config.index_file();
    fs::create_dir_all(&output_root).at(&output_root)?;

    if !config.content_dir.exists() {
        info!(
            content_dir = %config.content_dir.display(),
            "No content directory found; writing empty index"
        );
        let index = ArticleIndex::default();
        write_index(&index, &index_path)?;
        return Ok(BuildReport {
            index,
            index_path,
            mirror_dir: None,
            mirrored_files: 0,
        });
    }

    let index = scan::scan(
        &config.content_dir,
        &config.content_url_prefix(),
        &config.index,
    )?;
    info!(count = index.articles.len(), "Scanned articles");

    let mirror_dir = config.mirror_dir();
    let mirrored_files = mirror_content(&config.content_dir, &mirror_dir)?;
    info!(
        files = mirrored_files,
        mirror = %mirror_dir.display(),
        "Mirrored content"
    );

    write_index(&index, &index_path)?;
    info!(path = %index_path.display(), "Wrote article index");

    Ok(BuildReport {
        index,
        index_path,
        mirror_dir: Some(mirror_dir),
        mirrored_files,
    })
}

/// Replace `dst` with a recursive copy of `src`. Returns the number of
/// files copied.
pub fn mirror_content(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    match fs::remove_dir_all(dst) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(GenerateError::Io {
                path: dst.to_path_buf(),
                source,
            });
        }
    }
    copy_dir_recursive(src, dst)
}

/// Links are followed: the mirror holds real files and directories where the
/// content tree has symlinks.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).at(&target)?;
        } else {
            fs::copy(entry.path(), &target).at(entry.path())?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Serialize the index as pretty JSON and move it into place in one step.
pub fn write_index(index: &ArticleIndex, path: &Path) -> Result<(), GenerateError> {
    let json = serde_json::to_string_pretty(index)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).at(&tmp)?;
    fs::rename(&tmp, path).at(path)?;
    Ok(())
}
