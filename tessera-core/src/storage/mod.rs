//! Source acquisition
//!
//! Fetchers turn a source location into raw bytes. The loader only sees the
//! [`ResourceFetcher`] trait, so HTTP, local mirrors and in-memory fixtures
//! are interchangeable.

pub mod file;
pub mod http;
pub mod memory;

pub use file::FileFetcher;
pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

use bytes::Bytes;
use std::future::Future;
use tracing::debug;

use crate::config::SourceSpec;
use crate::error::{Result, TesseraError};
use crate::metrics::standard;

/// Anything that can produce the raw bytes behind a source location
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the full contents of `location`
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Fetch a source and verify its checksum when one is configured
pub async fn fetch_source<F: ResourceFetcher>(fetcher: &F, source: &SourceSpec) -> Result<Bytes> {
    let data = fetcher.fetch(&source.location).await?;

    if let Some(expected) = source.expected_crc32c {
        let actual = crc32c::crc32c(&data);
        if actual != expected {
            return Err(TesseraError::unavailable(
                source.location.as_str(),
                format!("checksum mismatch: expected {:#010x}, got {:#010x}", expected, actual),
            ));
        }
    }

    standard::BYTES_FETCHED.inc_by(data.len() as u64);
    debug!("Fetched {} ({} bytes)", source.location, data.len());
    Ok(data)
}
