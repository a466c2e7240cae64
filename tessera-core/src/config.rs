//! Loader configuration
//!
//! Defaults carry the fixed dataset constants. `from_env` lets a driver point
//! the loader at a mirror or pin the shuffle seed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, TesseraError};
use crate::{
    MNIST_IMAGES_SPRITE_URL, MNIST_LABELS_URL, NUM_DATASET_ELEMENTS, DECODE_CHUNK_ROWS,
};

/// Shape of the packed dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLayout {
    /// Total examples in the sprite (one sprite row per example)
    pub num_elements: usize,
    /// Sprite rows decoded per chunk
    pub chunk_rows: usize,
    /// Train fraction numerator
    pub train_numerator: usize,
    /// Train fraction denominator
    pub train_denominator: usize,
}

impl DatasetLayout {
    /// The published sprite: 65000 examples, 5/6 train
    pub const MNIST: Self = Self {
        num_elements: NUM_DATASET_ELEMENTS,
        chunk_rows: DECODE_CHUNK_ROWS,
        train_numerator: 5,
        train_denominator: 6,
    };

    /// Layout with a custom example count and the MNIST split ratio
    pub fn with_elements(num_elements: usize) -> Self {
        Self {
            num_elements,
            ..Self::MNIST
        }
    }

    /// Set rows per decode chunk
    pub fn with_chunk_rows(mut self, chunk_rows: usize) -> Self {
        self.chunk_rows = chunk_rows;
        self
    }

    /// `floor(num_elements * numerator / denominator)`
    pub fn train_count(&self) -> usize {
        self.num_elements * self.train_numerator / self.train_denominator
    }

    /// Everything after the train cut
    pub fn test_count(&self) -> usize {
        self.num_elements - self.train_count()
    }

    /// Number of decode chunks covering the sprite
    pub fn num_chunks(&self) -> usize {
        self.num_elements.div_ceil(self.chunk_rows)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.num_elements == 0 || self.chunk_rows == 0 || self.train_denominator == 0 {
            return Err(TesseraError::Config {
                reason: format!("degenerate dataset layout: {:?}", self),
            });
        }
        if self.train_numerator > self.train_denominator {
            return Err(TesseraError::Config {
                reason: format!(
                    "train fraction {}/{} exceeds 1",
                    self.train_numerator, self.train_denominator
                ),
            });
        }
        let train = self.train_count();
        if train == 0 || train == self.num_elements {
            return Err(TesseraError::Config {
                reason: format!(
                    "layout leaves an empty subset: {} train of {}",
                    train, self.num_elements
                ),
            });
        }
        Ok(())
    }
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self::MNIST
    }
}

/// One fetchable source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// URL for the HTTP fetcher, path for the file fetcher
    pub location: String,
    /// Expected CRC32C of the raw bytes (optional)
    pub expected_crc32c: Option<u32>,
}

impl SourceSpec {
    /// Create an unchecked source
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            expected_crc32c: None,
        }
    }

    /// Set expected checksum
    pub fn with_checksum(mut self, crc32c: u32) -> Self {
        self.expected_crc32c = Some(crc32c);
        self
    }
}

/// Image and label source locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Sprite image
    pub images: SourceSpec,
    /// Raw one-hot label bytes
    pub labels: SourceSpec,
    /// Read sources from this directory instead of over HTTP
    pub data_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            images: SourceSpec::new(MNIST_IMAGES_SPRITE_URL),
            labels: SourceSpec::new(MNIST_LABELS_URL),
            data_dir: None,
        }
    }
}

/// HTTP fetcher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Attempts per source before giving up
    pub retry_count: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
            retry_count: 3,
        }
    }
}

/// Top-level loader configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub sources: SourceConfig,
    pub layout: DatasetLayout,
    pub http: HttpConfig,
    /// Shuffle seed; `None` draws one from OS entropy at load time
    pub seed: Option<u64>,
}

impl LoaderConfig {
    /// Defaults overridden by `TESSERA_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LoaderConfig::from_env`] with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("TESSERA_IMAGES_URL") {
            config.sources.images.location = url;
        }
        if let Some(url) = lookup("TESSERA_LABELS_URL") {
            config.sources.labels.location = url;
        }
        if let Some(dir) = lookup("TESSERA_DATA_DIR") {
            config.sources.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(seed) = lookup("TESSERA_SEED") {
            config.seed = Some(parse_var("TESSERA_SEED", &seed)?);
        }
        if let Some(secs) = lookup("TESSERA_REQUEST_TIMEOUT_SECS") {
            config.http.request_timeout_secs = parse_var("TESSERA_REQUEST_TIMEOUT_SECS", &secs)?;
        }
        if let Some(retries) = lookup("TESSERA_FETCH_RETRIES") {
            config.http.retry_count = parse_var("TESSERA_FETCH_RETRIES", &retries)?;
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| TesseraError::Config {
        reason: format!("{}={:?}: {}", key, value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_mnist_split_counts() {
        let layout = DatasetLayout::MNIST;
        assert_eq!(layout.train_count(), 54166);
        assert_eq!(layout.test_count(), 10834);
        assert_eq!(layout.train_count() + layout.test_count(), 65000);
        assert_eq!(layout.num_chunks(), 13);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_partial_last_chunk() {
        let layout = DatasetLayout::with_elements(12).with_chunk_rows(5);
        assert_eq!(layout.num_chunks(), 3);
        assert_eq!(layout.train_count(), 10);
        assert_eq!(layout.test_count(), 2);
    }

    #[test]
    fn test_degenerate_layouts_rejected() {
        assert!(DatasetLayout::with_elements(0).validate().is_err());
        assert!(DatasetLayout::with_elements(1).validate().is_err());
        assert!(DatasetLayout::with_elements(12).with_chunk_rows(0).validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TESSERA_IMAGES_URL", "http://mirror/images.png"),
            ("TESSERA_SEED", "42"),
            ("TESSERA_FETCH_RETRIES", "5"),
        ]
        .into_iter()
        .collect();

        let config = LoaderConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.sources.images.location, "http://mirror/images.png");
        assert_eq!(config.sources.labels.location, MNIST_LABELS_URL);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.http.retry_count, 5);
        assert_eq!(config.layout, DatasetLayout::MNIST);
    }

    #[test]
    fn test_bad_env_value() {
        let err = LoaderConfig::from_lookup(|k| {
            (k == "TESSERA_SEED").then(|| "not-a-number".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, TesseraError::Config { .. }));
    }
}
