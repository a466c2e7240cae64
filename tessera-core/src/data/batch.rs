//! Batch and example outputs
//!
//! Always owned copies. Callers never hold references into the loader's
//! buffers.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::{IMAGE_HEIGHT, IMAGE_SIZE, IMAGE_WIDTH, NUM_CLASSES};

/// One decoded example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// 784 intensities in [0, 1], row-major 28x28
    pub image: Vec<f32>,
    /// One-hot row over 10 classes
    pub label: Vec<u8>,
}

impl Example {
    /// Position of the hot bit, `None` if the row has none
    pub fn class_index(&self) -> Option<usize> {
        class_of(&self.label)
    }

    /// Render as a 28x28 single-channel image
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(IMAGE_WIDTH as u32, IMAGE_HEIGHT as u32, |x, y| {
            let v = self.image[y as usize * IMAGE_WIDTH + x as usize];
            Luma([to_byte(v)])
        })
    }
}

/// A batch of examples, paired row-for-row
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    images: Vec<f32>,
    labels: Vec<u8>,
    source_indices: Vec<usize>,
}

impl Batch {
    pub(crate) fn new(images: Vec<f32>, labels: Vec<u8>, source_indices: Vec<usize>) -> Self {
        debug_assert_eq!(images.len(), source_indices.len() * IMAGE_SIZE);
        debug_assert_eq!(labels.len(), source_indices.len() * NUM_CLASSES);
        Self {
            images,
            labels,
            source_indices,
        }
    }

    /// Number of examples
    pub fn size(&self) -> usize {
        self.source_indices.len()
    }

    /// Flat `size * 784` image buffer
    pub fn images(&self) -> &[f32] {
        &self.images
    }

    /// Flat `size * 10` label buffer
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// `[size, 784]`
    pub fn images_shape(&self) -> [usize; 2] {
        [self.size(), IMAGE_SIZE]
    }

    /// `[size, 10]`
    pub fn labels_shape(&self) -> [usize; 2] {
        [self.size(), NUM_CLASSES]
    }

    /// Subset-local indices the rows were copied from, in draw order
    pub fn source_indices(&self) -> &[usize] {
        &self.source_indices
    }

    /// Image row `i`
    pub fn image(&self, i: usize) -> &[f32] {
        &self.images[i * IMAGE_SIZE..(i + 1) * IMAGE_SIZE]
    }

    /// Label row `i`
    pub fn label(&self, i: usize) -> &[u8] {
        &self.labels[i * NUM_CLASSES..(i + 1) * NUM_CLASSES]
    }

    /// Labels widened to `f32` for numeric consumers
    pub fn labels_f32(&self) -> Vec<f32> {
        self.labels.iter().map(|&b| b as f32).collect()
    }

    /// Class of every row; rows without a hot bit map to `None`
    pub fn class_indices(&self) -> Vec<Option<usize>> {
        self.labels.chunks_exact(NUM_CLASSES).map(class_of).collect()
    }

    /// Owned copy of row `i`
    pub fn example(&self, i: usize) -> Example {
        Example {
            image: self.image(i).to_vec(),
            label: self.label(i).to_vec(),
        }
    }

    /// All rows tiled left to right into one `28 x (28 * size)` strip
    pub fn to_strip_image(&self) -> GrayImage {
        let width = (IMAGE_WIDTH * self.size()) as u32;
        GrayImage::from_fn(width, IMAGE_HEIGHT as u32, |x, y| {
            let (row, col) = (x as usize / IMAGE_WIDTH, x as usize % IMAGE_WIDTH);
            let v = self.image(row)[y as usize * IMAGE_WIDTH + col];
            Luma([to_byte(v)])
        })
    }

    /// Take the raw buffers
    pub fn into_parts(self) -> (Vec<f32>, Vec<u8>) {
        (self.images, self.labels)
    }
}

fn class_of(row: &[u8]) -> Option<usize> {
    row.iter().position(|&b| b == 1)
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
