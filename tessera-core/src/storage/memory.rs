//! In-memory fetcher for pre-downloaded sources

use bytes::Bytes;
use std::collections::HashMap;

use super::ResourceFetcher;
use crate::error::{Result, TesseraError};

/// Serves sources from a map of location to bytes
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    resources: HashMap<String, Bytes>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under `location`
    pub fn with_resource(mut self, location: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(location, data);
        self
    }

    /// Register or replace bytes under `location`
    pub fn insert(&mut self, location: impl Into<String>, data: impl Into<Bytes>) {
        self.resources.insert(location.into(), data.into());
    }
}

impl ResourceFetcher for MemoryFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes> {
        // Bytes clones share the allocation
        self.resources
            .get(location)
            .cloned()
            .ok_or_else(|| TesseraError::unavailable(location, "not found"))
    }
}
