//! Stress tests for batch sampling
//!
//! Run with: cargo test --release --test stress_sampling -- --nocapture

mod common;

use std::time::Instant;

use tessera_core::{MnistData, Split};

/// Configuration for stress tests
struct StressConfig {
    num_elements: usize,
    chunk_rows: usize,
    batch_size: usize,
    epochs: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            num_elements: 1200,
            chunk_rows: 500,
            batch_size: 64,
            epochs: 5,
        }
    }
}

/// Every epoch's worth of draws covers the train subset exactly once
#[tokio::test]
async fn stress_epoch_coverage() {
    let config = StressConfig::default();
    let mut data = MnistData::new(common::config(config.num_elements, config.chunk_rows, 2024));
    data.load_with(&common::fetcher(config.num_elements)).await.unwrap();

    let train = data.num_train();
    let mut counts = vec![0usize; train];
    let total_draws = train * config.epochs;

    let start = Instant::now();
    let mut drawn = 0;
    while drawn < total_draws {
        let size = config.batch_size.min(total_draws - drawn);
        let batch = data.next_train_batch(size).unwrap();
        for &idx in batch.source_indices() {
            counts[idx] += 1;
        }
        drawn += size;
    }
    let elapsed = start.elapsed();

    assert!(counts.iter().all(|&c| c == config.epochs));
    assert_eq!(data.cursor(Split::Train).unwrap(), 0);

    println!("Epoch coverage test:");
    println!("  Train examples: {}", train);
    println!("  Draws: {}", total_draws);
    println!("  Elapsed: {:?}", elapsed);
    println!(
        "  Examples/sec: {:.0}",
        total_draws as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
}

/// Interleaved train and test draws never disturb each other
#[tokio::test]
async fn stress_interleaved_subsets() {
    let config = StressConfig::default();
    let mut data = MnistData::new(common::config(config.num_elements, config.chunk_rows, 7));
    data.load_with(&common::fetcher(config.num_elements)).await.unwrap();

    let train_perm = data.permutation(Split::Train).unwrap().to_vec();
    let test_perm = data.permutation(Split::Test).unwrap().to_vec();

    let mut train_seq = Vec::new();
    let mut test_seq = Vec::new();
    for round in 0..200 {
        let train = data.next_train_batch(1 + round % 7).unwrap();
        train_seq.extend_from_slice(train.source_indices());
        let test = data.next_test_batch(1 + round % 3).unwrap();
        test_seq.extend_from_slice(test.source_indices());
    }

    let expected_train: Vec<usize> = train_perm.iter().cycle().take(train_seq.len()).copied().collect();
    let expected_test: Vec<usize> = test_perm.iter().cycle().take(test_seq.len()).copied().collect();
    assert_eq!(train_seq, expected_train);
    assert_eq!(test_seq, expected_test);
}
