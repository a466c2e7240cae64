//! Tessera Core - sprite-packed MNIST loader
//!
//! This crate provides:
//! - Concurrent acquisition of the sprite image and label stream
//! - Chunked sprite decode into normalized pixel buffers
//! - Contiguous train/test split with seeded shuffles
//! - Cyclic batch sampling over the fixed shuffles

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod storage;

pub use config::{DatasetLayout, LoaderConfig};
pub use data::{Batch, Example, LoadReport, MnistData, Split};
pub use error::TesseraError;

/// Width of one example in pixels
pub const IMAGE_WIDTH: usize = 28;

/// Height of one example in pixels
pub const IMAGE_HEIGHT: usize = 28;

/// Intensities per example
pub const IMAGE_SIZE: usize = IMAGE_WIDTH * IMAGE_HEIGHT;

/// One-hot label width
pub const NUM_CLASSES: usize = 10;

/// Examples packed in the published sprite
pub const NUM_DATASET_ELEMENTS: usize = 65000;

/// Sprite rows decoded per chunk
pub const DECODE_CHUNK_ROWS: usize = 5000;

/// Published sprite image
pub const MNIST_IMAGES_SPRITE_URL: &str =
    "https://storage.googleapis.com/learnjs-data/model-builder/mnist_images.png";

/// Published one-hot label bytes
pub const MNIST_LABELS_URL: &str =
    "https://storage.googleapis.com/learnjs-data/model-builder/mnist_labels_uint8";
