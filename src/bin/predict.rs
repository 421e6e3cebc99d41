//! Scoring job: loads the persisted artifact and scores one feature
//! mapping supplied as JSON.
//!
//! # Usage
//! ```sh
//! cargo run --bin predict -- --features \
//!   '{"SPY_Log_Ret":-0.005,"SPY_Vol_30d":0.25,"RSI":35,"BB_Width":0.08,"Trend_Signal":0}'
//! ```

use anyhow::Result;
use clap::Parser;
use crashrisk::application::Predictor;
use crashrisk::config::PipelineConfig;
use crashrisk::infrastructure::ModelStore;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the trained model artifact
    #[arg(long)]
    model: Option<PathBuf>,

    /// JSON object mapping the five feature names to values
    #[arg(long)]
    features: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    let mut config = PipelineConfig::from_env()?;
    if let Some(model) = args.model {
        config.model_path = model;
    }

    let request: HashMap<String, f64> = serde_json::from_str(&args.features)?;

    let predictor = Predictor::load(&ModelStore::new(), &config.model_path)?;
    let score = predictor.predict(&request)?;

    println!("--------------------------------");
    println!("RISK REPORT");
    println!("--------------------------------");
    println!("Crash probability: {:.2}%", score.probability * 100.0);
    if score.label == 1 {
        println!("ALERT: HIGH RISK DETECTED.");
    } else {
        println!("STATUS: MARKET NORMAL.");
    }
    Ok(())
}
