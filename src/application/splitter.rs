//! Chronological train/test partitioning.
//!
//! Time-series causality forbids shuffling: the split is always a strict
//! prefix/suffix cut, so every training date precedes every test date.

use tracing::info;

use crate::config::PipelineConfig;
use crate::domain::errors::PipelineError;
use crate::domain::types::{LabeledDataset, Split};

/// Stricter than the bare minimum of 2 so held-out metrics stay meaningful.
pub const MIN_ROWS: usize = 10;

pub struct Splitter {
    ratio: f64,
}

impl Splitter {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            ratio: config.split_ratio,
        }
    }

    /// Splits at `floor(ratio * n)`. No randomness anywhere.
    pub fn split(&self, dataset: LabeledDataset) -> Result<Split, PipelineError> {
        let n = dataset.len();
        if n < MIN_ROWS {
            return Err(PipelineError::InsufficientData { rows: n, min: MIN_ROWS });
        }

        let split_index = (self.ratio * n as f64).floor() as usize;
        if split_index == 0 || split_index >= n {
            return Err(PipelineError::InsufficientData { rows: n, min: MIN_ROWS });
        }

        let mut train_rows = dataset.rows;
        let test_rows = train_rows.split_off(split_index);

        let split = Split {
            train: LabeledDataset { rows: train_rows },
            test: LabeledDataset { rows: test_rows },
        };
        debug_assert!(
            split.train.rows.last().map(|r| r.date) < split.test.rows.first().map(|r| r.date)
        );
        info!(
            "chronological split: {} train rows, {} test rows",
            split.train.len(),
            split.test.len()
        );
        Ok(split)
    }
}
