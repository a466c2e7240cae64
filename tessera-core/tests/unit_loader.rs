//! Unit tests for the dataset loader
//!
//! Covers the split, the shuffles, cyclic batching, and load failure paths
//! against an in-memory synthetic sprite.

mod common;

use std::collections::HashSet;

use tessera_core::{MnistData, Split, TesseraError, IMAGE_SIZE, NUM_CLASSES};

/// 150 examples: 125 train, 25 test, decoded in 4 chunks
const N: usize = 150;
const CHUNK: usize = 40;

async fn loaded(seed: u64) -> MnistData {
    let mut data = MnistData::new(common::config(N, CHUNK, seed));
    data.load_with(&common::fetcher(N)).await.unwrap();
    data
}

#[tokio::test]
async fn test_load_report() {
    let mut data = MnistData::new(common::config(N, CHUNK, 42));
    assert!(!data.is_loaded());

    let report = data.load_with(&common::fetcher(N)).await.unwrap();
    assert!(data.is_loaded());
    assert_eq!(report.num_train, 125);
    assert_eq!(report.num_test, 25);
    assert_eq!(report.num_train + report.num_test, N);
    assert_eq!(report.decode_chunks, 4);
    assert_eq!(report.label_bytes, N * NUM_CLASSES);
    assert_eq!(report.seed, 42);
    assert_eq!(data.report(), Some(&report));
}

#[tokio::test]
async fn test_permutations_are_bijections() {
    let data = loaded(1).await;

    for (split, len) in [(Split::Train, 125), (Split::Test, 25)] {
        let perm = data.permutation(split).unwrap();
        assert_eq!(perm.len(), len);
        let unique: HashSet<_> = perm.iter().copied().collect();
        assert_eq!(unique, (0..len).collect::<HashSet<_>>());
    }
}

#[tokio::test]
async fn test_cyclic_walk_over_train() {
    let mut data = loaded(2).await;
    let perm = data.permutation(Split::Train).unwrap().to_vec();

    let drawn: Vec<usize> = (0..125)
        .map(|_| data.next_train_batch(1).unwrap().source_indices()[0])
        .collect();
    assert_eq!(drawn, perm);
    assert_eq!(drawn.iter().copied().collect::<HashSet<_>>().len(), 125);

    // The 126th draw starts the identical sequence over
    let again = data.next_train_batch(1).unwrap();
    assert_eq!(again.source_indices()[0], drawn[0]);
}

#[tokio::test]
async fn test_first_test_batch_follows_permutation() {
    let mut data = loaded(3).await;
    let perm = data.permutation(Split::Test).unwrap().to_vec();

    let batch = data.next_test_batch(20).unwrap();
    assert_eq!(batch.size(), 20);
    assert_eq!(batch.images().len(), 20 * IMAGE_SIZE);
    assert_eq!(batch.labels().len(), 20 * NUM_CLASSES);
    assert_eq!(batch.source_indices(), &perm[..20]);
}

#[tokio::test]
async fn test_rows_are_paired_and_split_is_contiguous() {
    let mut data = loaded(4).await;
    let train_count = data.num_train();

    let train = data.next_train_batch(64).unwrap();
    for row in 0..train.size() {
        let stored = train.source_indices()[row];
        let global = common::encoded_index(train.image(row));
        assert_eq!(global, stored, "train index maps to dataset position");
        assert_eq!(train.example(row).class_index(), Some(global % NUM_CLASSES));
    }

    let test = data.next_test_batch(25).unwrap();
    for row in 0..test.size() {
        let stored = test.source_indices()[row];
        let global = common::encoded_index(test.image(row));
        assert_eq!(global, train_count + stored, "test subset starts at the cut");
        assert_eq!(test.example(row).class_index(), Some(global % NUM_CLASSES));
    }
}

#[tokio::test]
async fn test_cursors_are_independent() {
    let mut data = loaded(5).await;

    data.next_train_batch(30).unwrap();
    assert_eq!(data.cursor(Split::Train).unwrap(), 30);
    assert_eq!(data.cursor(Split::Test).unwrap(), 0);

    data.next_test_batch(7).unwrap();
    assert_eq!(data.cursor(Split::Train).unwrap(), 30);
    assert_eq!(data.cursor(Split::Test).unwrap(), 7);
}

#[tokio::test]
async fn test_batch_larger_than_subset_wraps() {
    let mut data = loaded(6).await;
    let perm = data.permutation(Split::Test).unwrap().to_vec();

    let batch = data.next_test_batch(60).unwrap();
    let expected: Vec<usize> = perm.iter().cycle().take(60).copied().collect();
    assert_eq!(batch.source_indices(), expected.as_slice());
    assert_eq!(data.cursor(Split::Test).unwrap(), 60 % 25);
}

#[tokio::test]
async fn test_seed_determinism() {
    let a = loaded(99).await;
    let b = loaded(99).await;
    let c = loaded(100).await;

    assert_eq!(a.permutation(Split::Train).unwrap(), b.permutation(Split::Train).unwrap());
    assert_eq!(a.permutation(Split::Test).unwrap(), b.permutation(Split::Test).unwrap());
    assert_ne!(a.permutation(Split::Train).unwrap(), c.permutation(Split::Train).unwrap());
}

#[tokio::test]
async fn test_example_is_stored_order() {
    let data = loaded(7).await;

    let example = data.example(Split::Test, 3).unwrap();
    assert_eq!(common::encoded_index(&example.image), data.num_train() + 3);
    assert_eq!(example.to_gray_image().dimensions(), (28, 28));

    assert!(matches!(
        data.example(Split::Test, 25),
        Err(TesseraError::IndexOutOfRange { index: 25, len: 25 })
    ));
}

#[tokio::test]
async fn test_zero_batch_size_rejected() {
    let mut data = loaded(8).await;
    assert!(matches!(
        data.next_train_batch(0),
        Err(TesseraError::InvalidBatchSize { batch_size: 0 })
    ));
}

#[tokio::test]
async fn test_missing_source_leaves_unloaded() {
    let fetcher = tessera_core::storage::MemoryFetcher::new()
        .with_resource(common::IMAGES, common::sprite_png(N));

    let mut data = MnistData::new(common::config(N, CHUNK, 1));
    let err = data.load_with(&fetcher).await.unwrap_err();
    assert!(matches!(err, TesseraError::ResourceUnavailable { .. }));
    assert!(err.is_retryable());
    assert!(!data.is_loaded());
    assert!(matches!(data.next_test_batch(1), Err(TesseraError::NotLoaded)));
}

#[tokio::test]
async fn test_truncated_labels_fail() {
    let mut labels = common::label_bytes(N);
    labels.truncate(labels.len() - 1);
    let fetcher = tessera_core::storage::MemoryFetcher::new()
        .with_resource(common::IMAGES, common::sprite_png(N))
        .with_resource(common::LABELS, labels);

    let mut data = MnistData::new(common::config(N, CHUNK, 1));
    assert!(matches!(
        data.load_with(&fetcher).await,
        Err(TesseraError::ResourceUnavailable { .. })
    ));
    assert!(!data.is_loaded());
}

#[tokio::test]
async fn test_malformed_sprite_fails() {
    let fetcher = tessera_core::storage::MemoryFetcher::new()
        .with_resource(common::IMAGES, b"\x89PNG but not really".to_vec())
        .with_resource(common::LABELS, common::label_bytes(N));

    let mut data = MnistData::new(common::config(N, CHUNK, 1));
    assert!(matches!(
        data.load_with(&fetcher).await,
        Err(TesseraError::ResourceUnavailable { .. })
    ));
    assert!(!data.is_loaded());
}

#[tokio::test]
async fn test_failed_reload_keeps_ready_state() {
    let mut data = loaded(9).await;
    data.next_train_batch(10).unwrap();
    let perm = data.permutation(Split::Train).unwrap().to_vec();

    let empty = tessera_core::storage::MemoryFetcher::new();
    assert!(data.load_with(&empty).await.is_err());

    assert!(data.is_loaded());
    assert_eq!(data.permutation(Split::Train).unwrap(), perm.as_slice());
    assert_eq!(data.cursor(Split::Train).unwrap(), 10);
}

#[tokio::test]
async fn test_load_from_local_mirror() {
    let dir = std::env::temp_dir().join(format!("tessera-mirror-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join("mnist_images.png"), common::sprite_png(N)).await.unwrap();
    tokio::fs::write(dir.join("mnist_labels_uint8"), common::label_bytes(N)).await.unwrap();

    let mut config = common::config(N, CHUNK, 12);
    config.sources.data_dir = Some(dir.clone());

    let mut data = MnistData::new(config);
    let report = data.load().await.unwrap();
    assert_eq!(report.num_test, 25);
    assert_eq!(data.next_test_batch(5).unwrap().size(), 5);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
