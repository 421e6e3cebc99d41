use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the feature/label/split/score pipeline.
///
/// Expected, recoverable conditions (missing reference column) are handled
/// locally with a warning and never appear here; everything in this enum
/// makes downstream results meaningless and must reach the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("no rows survived {stage}")]
    EmptyDataset { stage: &'static str },

    #[error("missing required features: {}", names.join(", "))]
    MissingFeature { names: Vec<String> },

    #[error("unexpected features in request: {}", names.join(", "))]
    UnexpectedFeature { names: Vec<String> },

    #[error("dataset too small to split: {rows} rows, need at least {min}")]
    InsufficientData { rows: usize, min: usize },

    #[error("model artifact not found at {}", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("classifier training failed: {reason}")]
    Training { reason: String },

    #[error("invalid price series: {reason}")]
    InvalidSeries { reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
