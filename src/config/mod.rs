//! Configuration for the crash-risk pipeline.
//!
//! One explicit configuration object carries every tunable the components
//! need (paths, thresholds, split ratio, class weight) and is passed by
//! reference into each stage — there is no process-wide mutable state.
//! Values come from defaults overridable via `CRASHRISK_*` environment
//! variables; the CLI binaries may override them again from arguments.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Pipeline configuration shared by all components.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw vendor CSV (two-level ticker/field header, date index).
    pub raw_data_path: PathBuf,
    /// Processed feature table CSV.
    pub features_path: PathBuf,
    /// Persisted model artifact.
    pub model_path: PathBuf,
    /// Market proxy whose close prices drive every feature.
    pub reference_ticker: String,
    /// Next-day log return below this value labels a crash.
    pub crash_threshold: f64,
    /// Chronological train fraction.
    pub split_ratio: f64,
    /// Replication factor for positive training rows (crashes are rare).
    pub positive_class_weight: u32,
    /// Probability cutoff for the binary label.
    pub decision_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_data_path: PathBuf::from("data/raw/market_data.csv"),
            features_path: PathBuf::from("data/processed/market_features.csv"),
            model_path: PathBuf::from("models/crash_risk_model.json"),
            reference_ticker: "SPY".to_string(),
            crash_threshold: -0.01,
            split_ratio: 0.8,
            positive_class_weight: 10,
            decision_threshold: 0.5,
        }
    }
}

impl PipelineConfig {
    /// Loads the configuration, applying `CRASHRISK_*` environment
    /// overrides on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            raw_data_path: env_path("CRASHRISK_RAW_DATA_PATH", defaults.raw_data_path),
            features_path: env_path("CRASHRISK_FEATURES_PATH", defaults.features_path),
            model_path: env_path("CRASHRISK_MODEL_PATH", defaults.model_path),
            reference_ticker: env::var("CRASHRISK_REFERENCE_TICKER")
                .unwrap_or(defaults.reference_ticker),
            crash_threshold: env_parse("CRASHRISK_CRASH_THRESHOLD", defaults.crash_threshold)?,
            split_ratio: env_parse("CRASHRISK_SPLIT_RATIO", defaults.split_ratio)?,
            positive_class_weight: env_parse(
                "CRASHRISK_POSITIVE_CLASS_WEIGHT",
                defaults.positive_class_weight,
            )?,
            decision_threshold: env_parse(
                "CRASHRISK_DECISION_THRESHOLD",
                defaults.decision_threshold,
            )?,
        })
    }

    /// Column name of the reference close price in the raw frame,
    /// e.g. `SPY_Close`.
    pub fn reference_column(&self) -> String {
        format!("{}_Close", self.reference_ticker)
    }
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or(default)
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw}")),
        Err(_) => Ok(default),
    }
}
