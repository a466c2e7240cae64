//! Sprite dataset loader
//!
//! Main interface: load once, then draw shuffled batches from either subset.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info};

use super::batch::{Batch, Example};
use super::decode::{decode_labels, decode_sprite};
use super::sampler::CyclicSampler;
use super::subset::{split_buffers, Split, Subset};
use crate::config::{DatasetLayout, LoaderConfig};
use crate::error::{Result, TesseraError};
use crate::metrics::standard;
use crate::storage::{fetch_source, FileFetcher, HttpFetcher, ResourceFetcher};

/// Summary of a successful load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Sprite bytes fetched
    pub image_bytes: usize,
    /// Label bytes fetched
    pub label_bytes: usize,
    /// Row chunks the sprite was decoded in
    pub decode_chunks: usize,
    pub num_train: usize,
    pub num_test: usize,
    /// Seed the permutations were built from
    pub seed: u64,
    /// Wall-clock load time
    pub duration_ms: u64,
    pub loaded_at: DateTime<Utc>,
}

/// Everything a successful load produces
#[derive(Debug)]
struct LoadedDataset {
    train: Subset,
    test: Subset,
    report: LoadReport,
}

impl LoadedDataset {
    fn subset(&self, split: Split) -> &Subset {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
        }
    }

    fn subset_mut(&mut self, split: Split) -> &mut Subset {
        match split {
            Split::Train => &mut self.train,
            Split::Test => &mut self.test,
        }
    }
}

#[derive(Debug)]
enum LoaderState {
    Unloaded,
    Ready(Box<LoadedDataset>),
}

/// Fetches the sprite-packed dataset and serves shuffled batches.
///
/// Starts unloaded. A successful [`load`](Self::load) makes it ready for
/// good; a failed load leaves the previous state untouched. Batch draws walk
/// a fixed per-subset permutation cyclically, so `num_train` single draws
/// visit every train example once before the sequence repeats.
#[derive(Debug)]
pub struct MnistData {
    config: LoaderConfig,
    state: LoaderState,
}

impl MnistData {
    /// Create an unloaded loader
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            state: LoaderState::Unloaded,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn layout(&self) -> &DatasetLayout {
        &self.config.layout
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoaderState::Ready(_))
    }

    /// Load using the configured transport: the local mirror when
    /// `data_dir` is set, HTTP otherwise
    pub async fn load(&mut self) -> Result<LoadReport> {
        match self.config.sources.data_dir.clone() {
            Some(dir) => self.load_with(&FileFetcher::with_root(dir)).await,
            None => {
                let fetcher = HttpFetcher::new(self.config.http.clone())?;
                self.load_with(&fetcher).await
            }
        }
    }

    /// Load through an explicit fetcher
    pub async fn load_with<F: ResourceFetcher>(&mut self, fetcher: &F) -> Result<LoadReport> {
        let start = Instant::now();

        match build_dataset(&self.config, fetcher).await {
            Ok(mut loaded) => {
                let elapsed = start.elapsed();
                loaded.report.duration_ms = elapsed.as_millis() as u64;
                standard::LOAD_DURATION.observe(elapsed.as_secs_f64());
                standard::LOADS_COMPLETED.inc();
                standard::LOADED_EXAMPLES.set(self.config.layout.num_elements as i64);

                info!(
                    "Loaded {} train / {} test examples in {:?} (seed {})",
                    loaded.report.num_train, loaded.report.num_test, elapsed, loaded.report.seed
                );

                let report = loaded.report.clone();
                self.state = LoaderState::Ready(Box::new(loaded));
                Ok(report)
            }
            Err(e) => {
                standard::LOADS_FAILED.inc();
                error!("Dataset load failed: {}", e);
                Err(e)
            }
        }
    }

    /// Next `batch_size` shuffled train examples
    pub fn next_train_batch(&mut self, batch_size: usize) -> Result<Batch> {
        self.next_batch(Split::Train, batch_size)
    }

    /// Next `batch_size` shuffled test examples
    pub fn next_test_batch(&mut self, batch_size: usize) -> Result<Batch> {
        self.next_batch(Split::Test, batch_size)
    }

    /// Next `batch_size` examples from `split`; only that split's cursor moves
    pub fn next_batch(&mut self, split: Split, batch_size: usize) -> Result<Batch> {
        let batch = self.ready_mut()?.subset_mut(split).next_batch(batch_size)?;
        debug!("Drew {} {} examples", batch.size(), split);
        Ok(batch)
    }

    /// Stored example `index` of `split`, in dataset order
    pub fn example(&self, split: Split, index: usize) -> Result<Example> {
        self.ready()?.subset(split).example(index)
    }

    /// Train subset size
    pub fn num_train(&self) -> usize {
        self.config.layout.train_count()
    }

    /// Test subset size
    pub fn num_test(&self) -> usize {
        self.config.layout.test_count()
    }

    /// Fixed shuffle of `split`
    pub fn permutation(&self, split: Split) -> Result<&[usize]> {
        Ok(self.ready()?.subset(split).sampler().permutation())
    }

    /// Cursor position of `split`
    pub fn cursor(&self, split: Split) -> Result<usize> {
        Ok(self.ready()?.subset(split).sampler().position())
    }

    /// Report from the load that produced the current state
    pub fn report(&self) -> Option<&LoadReport> {
        match &self.state {
            LoaderState::Ready(loaded) => Some(&loaded.report),
            LoaderState::Unloaded => None,
        }
    }

    fn ready(&self) -> Result<&LoadedDataset> {
        match &self.state {
            LoaderState::Ready(loaded) => Ok(&**loaded),
            LoaderState::Unloaded => Err(TesseraError::NotLoaded),
        }
    }

    fn ready_mut(&mut self) -> Result<&mut LoadedDataset> {
        match &mut self.state {
            LoaderState::Ready(loaded) => Ok(&mut **loaded),
            LoaderState::Unloaded => Err(TesseraError::NotLoaded),
        }
    }
}

/// Fetch both sources together, decode, split, and shuffle
async fn build_dataset<F: ResourceFetcher>(config: &LoaderConfig, fetcher: &F) -> Result<LoadedDataset> {
    let layout = config.layout;
    layout.validate()?;

    let (image_bytes, label_bytes) = tokio::try_join!(
        fetch_source(fetcher, &config.sources.images),
        fetch_source(fetcher, &config.sources.labels),
    )?;
    let (image_len, label_len) = (image_bytes.len(), label_bytes.len());

    let resource = config.sources.images.location.clone();
    let decoded = tokio::task::spawn_blocking(move || {
        standard::DECODE_DURATION.time(|| decode_sprite(&image_bytes, &layout, &resource))
    })
    .await
    .map_err(|e| TesseraError::Internal {
        message: format!("Sprite decode task failed: {}", e),
    })??;

    let labels = decode_labels(&label_bytes, &layout, &config.sources.labels.location)?;

    let train_count = layout.train_count();
    let test_count = layout.test_count();
    let ((train_images, train_labels), (test_images, test_labels)) =
        split_buffers(decoded.pixels, labels, train_count);

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let train_sampler = CyclicSampler::shuffled(train_count, &mut rng);
    let test_sampler = CyclicSampler::shuffled(test_count, &mut rng);

    let train = Subset::new(Split::Train, train_images, train_labels, train_sampler)?;
    let test = Subset::new(Split::Test, test_images, test_labels, test_sampler)?;

    Ok(LoadedDataset {
        train,
        test,
        report: LoadReport {
            image_bytes: image_len,
            label_bytes: label_len,
            decode_chunks: decoded.chunks,
            num_train: train_count,
            num_test: test_count,
            seed,
            duration_ms: 0,
            loaded_at: Utc::now(),
        },
    })
}
