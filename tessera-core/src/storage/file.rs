//! Local mirror fetcher

use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::ResourceFetcher;
use crate::error::{Result, TesseraError};

/// Reads sources from disk.
///
/// With a root, only the final path segment of a location is used, so the
/// default URLs resolve to `<root>/mnist_images.png` and
/// `<root>/mnist_labels_uint8`.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    /// Resolve locations as plain paths
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Resolve locations by file name inside `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Path a location maps to
    pub fn resolve(&self, location: &str) -> PathBuf {
        match &self.root {
            Some(root) => {
                let name = location.rsplit('/').next().unwrap_or(location);
                root.join(name)
            }
            None => Path::new(location).to_path_buf(),
        }
    }
}

impl ResourceFetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes> {
        let path = self.resolve(location);
        let data = tokio::fs::read(&path).await.map_err(|e| {
            TesseraError::unavailable(path.display().to_string(), e)
        })?;
        Ok(Bytes::from(data))
    }
}
