//! Feature-build job: raw vendor price CSV -> processed feature table CSV.
//!
//! # Usage
//! ```sh
//! cargo run --bin build_features -- --input data/raw/market_data.csv
//! ```

use anyhow::Result;
use clap::Parser;
use crashrisk::application::FeatureBuilder;
use crashrisk::config::PipelineConfig;
use crashrisk::domain::errors::PipelineError;
use crashrisk::infrastructure::{feature_csv, price_csv};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the raw market data CSV (two-level ticker/field header)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to write the processed feature table
    #[arg(long)]
    output: Option<PathBuf>,

    /// Reference ticker (market proxy)
    #[arg(long)]
    ticker: Option<String>,
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
        config.raw_data_path = input;
    }
    if let Some(output) = args.output {
        config.features_path = output;
    }
    if let Some(ticker) = args.ticker {
        config.reference_ticker = ticker;
    }

    info!("processing {}", config.raw_data_path.display());
    let frame = price_csv::load_price_frame(&config.raw_data_path)?;

    let table = FeatureBuilder::new(&config).build(&frame)?;
    if table.is_empty() {
        // Reference column absent: the builder degraded to an empty table
        return Err(PipelineError::EmptyDataset {
            stage: "feature generation",
        }
        .into());
    }

    feature_csv::write_feature_table(&table, &config.features_path)?;
    info!(
        "feature engineering complete: {} rows -> {}",
        table.len(),
        config.features_path.display()
    );
    Ok(())
}
