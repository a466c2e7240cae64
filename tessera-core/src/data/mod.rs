//! Dataset pipeline
//!
//! Decode, split, shuffle, and batch the sprite-packed dataset.

pub mod batch;
pub mod decode;
pub mod loader;
pub mod sampler;
pub mod subset;

pub use batch::{Batch, Example};
pub use decode::{chunk_ranges, decode_labels, decode_sprite, normalize, DecodedSprite};
pub use loader::{LoadReport, MnistData};
pub use sampler::CyclicSampler;
pub use subset::{split_buffers, Split, Subset};
