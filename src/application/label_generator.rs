//! Crash-label derivation from next-day returns.

use tracing::info;

use crate::config::PipelineConfig;
use crate::domain::errors::PipelineError;
use crate::domain::feature_registry;
use crate::domain::types::{FeatureTable, LabeledDataset, LabeledRow};

pub struct LabelGenerator {
    crash_threshold: f64,
}

impl LabelGenerator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            crash_threshold: config.crash_threshold,
        }
    }

    /// Derives `Target[t] = 1 iff LogReturn[t+1] < crash_threshold`.
    ///
    /// The final row has no next-day return and is always dropped. If the
    /// input already carries targets (a pre-labeled feature file), they are
    /// used as-is — re-running never overwrites an existing label.
    pub fn label(&self, table: &FeatureTable) -> Result<LabeledDataset, PipelineError> {
        if table.is_empty() {
            return Err(PipelineError::EmptyDataset { stage: "labeling" });
        }

        if table.rows.iter().all(|r| r.target.is_some()) {
            let rows = table
                .rows
                .iter()
                .map(|r| LabeledRow {
                    date: r.date,
                    features: feature_registry::row_to_vector(r),
                    target: r.target.unwrap_or(0),
                })
                .collect();
            info!("targets already present, keeping {} labels", table.len());
            return Ok(LabeledDataset { rows });
        }

        let rows: Vec<LabeledRow> = table
            .rows
            .windows(2)
            .map(|pair| {
                let (current, next) = (&pair[0], &pair[1]);
                LabeledRow {
                    date: current.date,
                    features: feature_registry::row_to_vector(current),
                    target: u8::from(next.log_ret < self.crash_threshold),
                }
            })
            .collect();

        let positives = rows.iter().filter(|r| r.target == 1).count();
        info!(
            "labeled {} rows ({} crash days, threshold {})",
            rows.len(),
            positives,
            self.crash_threshold
        );
        Ok(LabeledDataset { rows })
    }
}
