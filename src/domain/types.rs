use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::errors::PipelineError;

/// One named price column of a raw market-data frame. `None` marks a
/// missing observation (holiday, vendor gap) prior to forward-filling.
#[derive(Debug, Clone)]
pub struct PriceColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Date-indexed table of close prices, one column per ticker.
///
/// Dates are strictly increasing and unique; the constructor rejects
/// anything else so every downstream stage can rely on chronological order.
#[derive(Debug, Clone, Default)]
pub struct PriceFrame {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<PriceColumn>,
}

impl PriceFrame {
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<PriceColumn>) -> Result<Self, PipelineError> {
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(PipelineError::InvalidSeries {
                    reason: format!("dates not strictly increasing: {} then {}", pair[0], pair[1]),
                });
            }
        }
        for col in &columns {
            if col.values.len() != dates.len() {
                return Err(PipelineError::InvalidSeries {
                    reason: format!(
                        "column {} has {} values for {} dates",
                        col.name,
                        col.values.len(),
                        dates.len()
                    ),
                });
            }
        }
        Ok(Self { dates, columns })
    }

    pub fn column(&self, name: &str) -> Option<&PriceColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// One fully-populated feature vector for a single trading date.
///
/// Field order mirrors the canonical feature order in
/// [`crate::domain::feature_registry::FEATURE_NAMES`]; `target` is only
/// present once the row has been labeled (or was loaded pre-labeled).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub log_ret: f64,
    pub vol_30d: f64,
    pub rsi: f64,
    pub bb_width: f64,
    pub trend_signal: f64,
    pub target: Option<u8>,
}

/// Date-ordered table of feature rows. Only contains rows where every
/// feature is defined (warm-up rows are never stored).
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A labeled observation: feature values in canonical order plus the
/// binary crash target.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRow {
    pub date: NaiveDate,
    pub features: Vec<f64>,
    pub target: u8,
}

/// Date-ordered labeled dataset, consumed exactly once by the splitter.
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    pub rows: Vec<LabeledRow>,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature matrix in row-major order, ready for the classifier.
    pub fn feature_matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.features.clone()).collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.rows.iter().map(|r| f64::from(r.target)).collect()
    }
}

/// Chronological train/test partition: `train` is a strict prefix,
/// `test` the remaining suffix, so `max(train.dates) < min(test.dates)`.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: LabeledDataset,
    pub test: LabeledDataset,
}

/// Point-in-time risk score: crash probability plus the thresholded label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskScore {
    pub probability: f64,
    pub label: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_price_frame_rejects_duplicate_dates() {
        let result = PriceFrame::new(
            vec![d(1), d(1)],
            vec![PriceColumn {
                name: "SPY_Close".to_string(),
                values: vec![Some(400.0), Some(401.0)],
            }],
        );
        assert!(matches!(result, Err(PipelineError::InvalidSeries { .. })));
    }

    #[test]
    fn test_price_frame_rejects_out_of_order_dates() {
        let result = PriceFrame::new(vec![d(2), d(1)], vec![]);
        assert!(matches!(result, Err(PipelineError::InvalidSeries { .. })));
    }

    #[test]
    fn test_price_frame_rejects_ragged_columns() {
        let result = PriceFrame::new(
            vec![d(1), d(2)],
            vec![PriceColumn {
                name: "SPY_Close".to_string(),
                values: vec![Some(400.0)],
            }],
        );
        assert!(matches!(result, Err(PipelineError::InvalidSeries { .. })));
    }

    #[test]
    fn test_column_lookup_by_name() {
        let frame = PriceFrame::new(
            vec![d(1)],
            vec![PriceColumn {
                name: "SPY_Close".to_string(),
                values: vec![Some(400.0)],
            }],
        )
        .unwrap();
        assert!(frame.column("SPY_Close").is_some());
        assert!(frame.column("VIX_Close").is_none());
    }
}
