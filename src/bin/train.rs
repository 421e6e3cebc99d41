//! Training job: processed feature CSV -> label -> chronological split ->
//! train -> evaluate -> persist artifact.
//!
//! # Usage
//! ```sh
//! cargo run --bin train -- --input data/processed/market_features.csv
//! ```

use anyhow::Result;
use clap::Parser;
use crashrisk::application::{Classifier, Evaluator, ForestClassifier, LabelGenerator, Splitter};
use crashrisk::config::PipelineConfig;
use crashrisk::infrastructure::{ModelStore, feature_csv};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the processed feature table CSV
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to write the trained model artifact
    #[arg(long)]
    model: Option<PathBuf>,

    /// Replication weight for positive (crash) training rows
    #[arg(long)]
    pos_weight: Option<u32>,

    /// Chronological train fraction
    #[arg(long)]
    split_ratio: Option<f64>,

    /// Next-day log return below this labels a crash
    #[arg(long)]
    crash_threshold: Option<f64>,

    /// Probability cutoff for the binary label
    #[arg(long)]
    threshold: Option<f64>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    let mut config = PipelineConfig::from_env()?;
    if let Some(input) = args.input {
        config.features_path = input;
    }
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(pos_weight) = args.pos_weight {
        config.positive_class_weight = pos_weight;
    }
    if let Some(split_ratio) = args.split_ratio {
        config.split_ratio = split_ratio;
    }
    if let Some(crash_threshold) = args.crash_threshold {
        config.crash_threshold = crash_threshold;
    }
    if let Some(threshold) = args.threshold {
        config.decision_threshold = threshold;
    }

    info!("loading features from {}", config.features_path.display());
    let table = feature_csv::read_feature_table(&config.features_path)?;

    let labeled = LabelGenerator::new(&config).label(&table)?;
    let split = Splitter::new(&config).split(labeled)?;

    let classifier = ForestClassifier::new(&config);
    info!("training {:?} classifier", classifier.task_kind());
    // Early stopping runs against the held-out test partition
    let artifact = classifier.train(&split.train, &split.test)?;

    let report = Evaluator::new().evaluate(&artifact, &split.test)?;
    println!("------------------------------------------------");
    println!("Model performance on held-out tail");
    println!("------------------------------------------------");
    println!("{report}");

    ModelStore::new().save(&artifact, &config.model_path)?;
    info!("model saved to {}", config.model_path.display());
    Ok(())
}
