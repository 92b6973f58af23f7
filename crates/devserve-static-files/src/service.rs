//! File Service
//!
//! Resolves request paths beneath the static root directory

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

/// A file resolved for a request. `path` is the file actually served,
/// which differs from the request path when the index fallback applies.
#[derive(Debug)]
pub struct ServedFile {
    pub path: PathBuf,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct FileService {
    root: PathBuf,
    index: String,
}

impl FileService {
    pub fn new(root: PathBuf, index: String) -> Self {
        Self { root, index }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve and read the file for an inbound request path
    ///
    /// # Security
    /// - Path traversal is prevented by canonicalizing the resolved path
    /// - Only files within the root directory can be served
    ///
    /// # Fallback
    /// Directory requests and extension-less paths that miss on disk are
    /// served via the index document; asset-style paths (with an
    /// extension) surface `NotFound`.
    pub async fn get_file(&self, request_path: &str) -> io::Result<ServedFile> {
        let decoded = urlencoding::decode(request_path)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let relative = decoded.trim_start_matches('/');

        let mut candidate = if relative.is_empty() {
            self.root.join(&self.index)
        } else {
            self.root.join(relative)
        };

        if candidate.is_dir() {
            candidate = candidate.join(&self.index);
        }

        match self.read_guarded(&candidate).await {
            Ok(served) => Ok(served),
            Err(e) if e.kind() == io::ErrorKind::NotFound && !has_extension(relative) => {
                debug!(path = request_path, "falling back to index document");
                self.read_guarded(&self.root.join(&self.index)).await
            }
            Err(e) => Err(e),
        }
    }

    async fn read_guarded(&self, candidate: &Path) -> io::Result<ServedFile> {
        // Canonicalize to prevent path traversal attacks
        let canonical = fs::canonicalize(candidate).await?;
        let canonical_root = fs::canonicalize(&self.root).await?;

        if !canonical.starts_with(&canonical_root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Access denied: path outside static root",
            ));
        }

        let content = fs::read(&canonical).await?;
        Ok(ServedFile {
            path: canonical,
            content,
        })
    }
}

fn has_extension(relative: &str) -> bool {
    Path::new(relative)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some()
}
