//! Synthetic sprite fixtures shared by the integration tests

#![allow(dead_code)]

use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;

use tessera_core::config::SourceSpec;
use tessera_core::storage::MemoryFetcher;
use tessera_core::{DatasetLayout, LoaderConfig, IMAGE_SIZE, NUM_CLASSES};

pub const IMAGES: &str = "mem://mnist_images.png";
pub const LABELS: &str = "mem://mnist_labels_uint8";

/// Sprite where every pixel of example `i` is `i % 256`
pub fn sprite_png(num_elements: usize) -> Vec<u8> {
    let img = GrayImage::from_fn(IMAGE_SIZE as u32, num_elements as u32, |_, y| {
        Luma([(y % 256) as u8])
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode sprite");
    buf
}

/// One-hot rows where example `i` has class `i % 10`
pub fn label_bytes(num_elements: usize) -> Vec<u8> {
    let mut labels = vec![0u8; num_elements * NUM_CLASSES];
    for i in 0..num_elements {
        labels[i * NUM_CLASSES + i % NUM_CLASSES] = 1;
    }
    labels
}

/// Fetcher serving a consistent synthetic dataset
pub fn fetcher(num_elements: usize) -> MemoryFetcher {
    MemoryFetcher::new()
        .with_resource(IMAGES, sprite_png(num_elements))
        .with_resource(LABELS, label_bytes(num_elements))
}

/// Config pointing at the in-memory sources
pub fn config(num_elements: usize, chunk_rows: usize, seed: u64) -> LoaderConfig {
    let mut config = LoaderConfig::default();
    config.sources.images = SourceSpec::new(IMAGES);
    config.sources.labels = SourceSpec::new(LABELS);
    config.layout = DatasetLayout::with_elements(num_elements).with_chunk_rows(chunk_rows);
    config.seed = Some(seed);
    config
}

/// Dataset-order index encoded in an image row
pub fn encoded_index(image_row: &[f32]) -> usize {
    (image_row[0] * 255.0).round() as usize
}
