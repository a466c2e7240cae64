//! Train/test subsets
//!
//! A subset owns its slice of the decoded buffers and the sampler that walks
//! them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::batch::{Batch, Example};
use super::sampler::CyclicSampler;
use crate::error::{Result, TesseraError};
use crate::metrics::standard;
use crate::{IMAGE_SIZE, NUM_CLASSES};

/// Which subset to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Test => write!(f, "test"),
        }
    }
}

/// Contiguous examples plus their shuffled cursor
#[derive(Debug, Clone)]
pub struct Subset {
    split: Split,
    images: Vec<f32>,
    labels: Vec<u8>,
    sampler: CyclicSampler,
}

impl Subset {
    /// Assemble a subset, checking buffer and permutation lengths agree
    pub fn new(split: Split, images: Vec<f32>, labels: Vec<u8>, sampler: CyclicSampler) -> Result<Self> {
        let len = sampler.len();
        if images.len() != len * IMAGE_SIZE || labels.len() != len * NUM_CLASSES {
            return Err(TesseraError::Internal {
                message: format!(
                    "{} subset of {} examples got {} pixels and {} label bytes",
                    split,
                    len,
                    images.len(),
                    labels.len()
                ),
            });
        }

        Ok(Self {
            split,
            images,
            labels,
            sampler,
        })
    }

    pub fn split(&self) -> Split {
        self.split
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.sampler.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sampler.is_empty()
    }

    pub fn sampler(&self) -> &CyclicSampler {
        &self.sampler
    }

    /// Owned copy of the example at storage position `index`
    pub fn example(&self, index: usize) -> Result<Example> {
        if index >= self.len() {
            return Err(TesseraError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(Example {
            image: self.image_row(index).to_vec(),
            label: self.label_row(index).to_vec(),
        })
    }

    /// Draw `batch_size` examples through the sampler into fresh buffers
    pub fn next_batch(&mut self, batch_size: usize) -> Result<Batch> {
        if batch_size == 0 {
            return Err(TesseraError::InvalidBatchSize { batch_size });
        }

        let mut images = vec![0.0f32; batch_size * IMAGE_SIZE];
        let mut labels = vec![0u8; batch_size * NUM_CLASSES];
        let mut source_indices = Vec::with_capacity(batch_size);

        for i in 0..batch_size {
            let idx = self.sampler.next_index();

            images[i * IMAGE_SIZE..(i + 1) * IMAGE_SIZE].copy_from_slice(self.image_row(idx));
            labels[i * NUM_CLASSES..(i + 1) * NUM_CLASSES].copy_from_slice(self.label_row(idx));
            source_indices.push(idx);
        }

        standard::BATCHES_SERVED.inc();
        standard::EXAMPLES_DRAWN.inc_by(batch_size as u64);

        Ok(Batch::new(images, labels, source_indices))
    }

    fn image_row(&self, index: usize) -> &[f32] {
        &self.images[index * IMAGE_SIZE..(index + 1) * IMAGE_SIZE]
    }

    fn label_row(&self, index: usize) -> &[u8] {
        &self.labels[index * NUM_CLASSES..(index + 1) * NUM_CLASSES]
    }
}

/// Cut decoded buffers at `train_count` examples: `[0, cut)` train, the rest test
pub fn split_buffers(
    mut images: Vec<f32>,
    mut labels: Vec<u8>,
    train_count: usize,
) -> ((Vec<f32>, Vec<u8>), (Vec<f32>, Vec<u8>)) {
    let test_images = images.split_off(train_count * IMAGE_SIZE);
    let test_labels = labels.split_off(train_count * NUM_CLASSES);
    images.shrink_to_fit();
    labels.shrink_to_fit();
    ((images, labels), (test_images, test_labels))
}
