//! Sprite and label decoding
//!
//! The sprite stores one example per row: 784 pixels wide, one row per
//! example. It is read back in fixed row chunks so only one chunk's RGBA
//! readback is alive at a time next to the decoded image.

use image::{imageops, GenericImageView};
use std::ops::Range;
use tracing::debug;

use crate::config::DatasetLayout;
use crate::error::{Result, TesseraError};
use crate::{IMAGE_SIZE, NUM_CLASSES};

/// Normalized sprite pixels plus decode bookkeeping
#[derive(Debug, Clone)]
pub struct DecodedSprite {
    /// `num_elements * IMAGE_SIZE` intensities in [0, 1]
    pub pixels: Vec<f32>,
    /// Row chunks processed
    pub chunks: usize,
}

/// Map a raw intensity byte into [0, 1]
#[inline]
pub fn normalize(value: u8) -> f32 {
    value as f32 / 255.0
}

/// Row ranges covering `rows` in steps of `chunk_rows`; the last may be short
pub fn chunk_ranges(rows: usize, chunk_rows: usize) -> impl Iterator<Item = Range<usize>> {
    let step = chunk_rows.max(1);
    (0..rows)
        .step_by(step)
        .map(move |start| start..(start + step).min(rows))
}

/// Decode the sprite image into a flat normalized buffer.
///
/// Grayscale sprites carry equal channels, so only red is read back.
pub fn decode_sprite(bytes: &[u8], layout: &DatasetLayout, resource: &str) -> Result<DecodedSprite> {
    let sprite = image::load_from_memory(bytes)
        .map_err(|e| TesseraError::unavailable(resource, format!("failed to decode sprite: {}", e)))?;

    let (width, height) = sprite.dimensions();
    if width as usize != IMAGE_SIZE || height as usize != layout.num_elements {
        return Err(TesseraError::unavailable(
            resource,
            format!(
                "sprite is {}x{}, expected {}x{}",
                width, height, IMAGE_SIZE, layout.num_elements
            ),
        ));
    }

    let mut pixels = vec![0.0f32; layout.num_elements * IMAGE_SIZE];
    let mut chunks = 0;

    for rows in chunk_ranges(layout.num_elements, layout.chunk_rows) {
        let readback =
            imageops::crop_imm(&sprite, 0, rows.start as u32, width, rows.len() as u32).to_image();
        let out = &mut pixels[rows.start * IMAGE_SIZE..rows.end * IMAGE_SIZE];

        for (dst, px) in out.iter_mut().zip(readback.pixels()) {
            *dst = normalize(px.0[0]);
        }
        chunks += 1;
    }

    debug!(
        "Decoded sprite {}x{} in {} chunks of {} rows",
        width, height, chunks, layout.chunk_rows
    );

    Ok(DecodedSprite { pixels, chunks })
}

/// Validate the raw one-hot label stream and take it as the label buffer
pub fn decode_labels(bytes: &[u8], layout: &DatasetLayout, resource: &str) -> Result<Vec<u8>> {
    let expected = layout.num_elements * NUM_CLASSES;
    if bytes.len() != expected {
        return Err(TesseraError::unavailable(
            resource,
            format!("label stream is {} bytes, expected {}", bytes.len(), expected),
        ));
    }

    if let Some(offset) = bytes.iter().position(|&b| b > 1) {
        return Err(TesseraError::unavailable(
            resource,
            format!(
                "label byte {} at offset {} is not a one-hot bit",
                bytes[offset], offset
            ),
        ));
    }

    Ok(bytes.to_vec())
}
