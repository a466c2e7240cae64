//! Dataset inspection binary
//!
//! Loads the sprite dataset, renders the first test batch, and samples train
//! batches to show the class mix.

use tessera_core::metrics::gather_loader_metrics;
use tessera_core::{LoaderConfig, MnistData, NUM_CLASSES};
use tracing::{error, info};

const EXAMPLE_COUNT: usize = 20;
const TRAIN_BATCH_SIZE: usize = 512;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting Tessera inspect");

    let config = LoaderConfig::from_env()?;
    let examples_out = std::env::var("TESSERA_EXAMPLES_OUT").ok();
    let train_batches: usize = std::env::var("TESSERA_TRAIN_BATCHES")
        .ok()
        .map(|v| v.parse::<usize>())
        .transpose()?
        .unwrap_or(10);

    match &config.sources.data_dir {
        Some(dir) => info!("Reading sources from {}", dir.display()),
        None => info!("Fetching {}", config.sources.images.location),
    }

    let mut data = MnistData::new(config);
    let report = match data.load().await {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to load dataset: {}", e);
            return Err(e.into());
        }
    };
    info!("Load report: {}", serde_json::to_string(&report)?);

    let examples = data.next_test_batch(EXAMPLE_COUNT)?;
    let classes: Vec<String> = examples
        .class_indices()
        .iter()
        .map(|c| c.map_or_else(|| "?".to_string(), |c| c.to_string()))
        .collect();
    info!("First {} test examples: classes [{}]", examples.size(), classes.join(", "));

    if let Some(path) = examples_out {
        examples.to_strip_image().save(&path)?;
        info!("Wrote example strip to {}", path);
    }

    let mut histogram = [0usize; NUM_CLASSES];
    for _ in 0..train_batches {
        let batch = data.next_train_batch(TRAIN_BATCH_SIZE)?;
        for class in batch.class_indices().into_iter().flatten() {
            histogram[class] += 1;
        }
    }
    info!(
        "Class counts over {} train batches of {}: {:?}",
        train_batches, TRAIN_BATCH_SIZE, histogram
    );

    print!("{}", gather_loader_metrics());
    Ok(())
}
