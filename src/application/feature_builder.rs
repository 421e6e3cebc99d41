//! Feature engineering over a cleaned close-price series.
//!
//! Converts a raw [`PriceFrame`] into the fixed five-feature table the
//! classifier is trained on. Missing prices are forward-filled (a gap takes
//! the last known value, never a future one); rows still missing afterwards
//! are dropped, and so is the warm-up period where any rolling feature is
//! undefined. The output only ever contains fully-populated feature vectors.

use chrono::NaiveDate;
use statrs::statistics::{Data, Distribution};
use ta::Next;
use ta::indicators::{BollingerBands, RelativeStrengthIndex, SimpleMovingAverage};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::domain::errors::PipelineError;
use crate::domain::types::{FeatureRow, FeatureTable, PriceFrame};

/// Rolling window for annualized volatility (trading days).
pub const VOLATILITY_WINDOW: usize = 30;
/// Rolling window for the SMA trend indicator.
pub const TREND_WINDOW: usize = 50;
const RSI_PERIOD: usize = 14;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_STD_DEV: f64 = 2.0;
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

pub struct FeatureBuilder {
    reference_column: String,
}

impl FeatureBuilder {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            reference_column: config.reference_column(),
        }
    }

    /// Builds the feature table for the reference ticker.
    ///
    /// A missing reference column is an expected, recoverable condition:
    /// it logs a warning and yields an empty table so the caller can check
    /// for the expected feature keys. An input that loses every row to
    /// cleaning or warm-up is an error — nothing downstream could be
    /// meaningful.
    pub fn build(&self, frame: &PriceFrame) -> Result<FeatureTable, PipelineError> {
        if frame.is_empty() {
            return Err(PipelineError::EmptyDataset {
                stage: "price cleaning",
            });
        }
        if frame.column(&self.reference_column).is_none() {
            warn!(
                "{} not found in price frame. Skipping feature generation.",
                self.reference_column
            );
            return Ok(FeatureTable::default());
        }

        let (dates, closes) = self.clean(frame)?;

        let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD).unwrap();
        let mut bollinger = BollingerBands::new(BOLLINGER_PERIOD, BOLLINGER_STD_DEV).unwrap();
        let mut sma = SimpleMovingAverage::new(TREND_WINDOW).unwrap();

        let mut log_returns: Vec<f64> = Vec::with_capacity(closes.len());
        let mut prev_close: Option<f64> = None;
        let mut rows = Vec::new();

        for (i, (&date, &close)) in dates.iter().zip(closes.iter()).enumerate() {
            let rsi_value = rsi.next(close);
            let bands = bollinger.next(close);
            let sma_value = sma.next(close);

            let log_ret = prev_close.map(|prev| (close / prev).ln());
            if let Some(value) = log_ret {
                log_returns.push(value);
            }
            prev_close = Some(close);

            let vol_30d = if log_returns.len() >= VOLATILITY_WINDOW {
                let window = log_returns[log_returns.len() - VOLATILITY_WINDOW..].to_vec();
                Data::new(window)
                    .std_dev()
                    .map(|sd| sd * TRADING_DAYS_PER_YEAR.sqrt())
            } else {
                None
            };

            // Trend is only meaningful once the SMA has a full window.
            let trend_signal = if i + 1 >= TREND_WINDOW {
                Some(if close > sma_value { 1.0 } else { 0.0 })
            } else {
                None
            };

            if let (Some(log_ret), Some(vol_30d), Some(trend_signal)) =
                (log_ret, vol_30d, trend_signal)
            {
                let bb_width = if bands.average > 0.0 {
                    (bands.upper - bands.lower) / bands.average
                } else {
                    0.0
                };
                rows.push(FeatureRow {
                    date,
                    log_ret,
                    vol_30d,
                    rsi: rsi_value,
                    bb_width,
                    trend_signal,
                    target: None,
                });
            }
        }

        if rows.is_empty() {
            return Err(PipelineError::EmptyDataset {
                stage: "feature warm-up",
            });
        }

        info!(
            "built {} feature rows from {} clean prices",
            rows.len(),
            closes.len()
        );
        Ok(FeatureTable { rows })
    }

    /// Forward-fills every column, drops rows still missing in any column,
    /// and returns the surviving dates with the reference closes.
    fn clean(&self, frame: &PriceFrame) -> Result<(Vec<NaiveDate>, Vec<f64>), PipelineError> {
        let filled: Vec<Vec<Option<f64>>> = frame
            .columns
            .iter()
            .map(|col| {
                let mut last = None;
                col.values
                    .iter()
                    .map(|v| {
                        if v.is_some() {
                            last = *v;
                        }
                        last
                    })
                    .collect()
            })
            .collect();

        let mut dates = Vec::new();
        let mut closes = Vec::new();
        let reference_idx = frame
            .columns
            .iter()
            .position(|c| c.name == self.reference_column)
            .ok_or(PipelineError::EmptyDataset {
                stage: "price cleaning",
            })?;

        for (row, &date) in frame.dates.iter().enumerate() {
            if filled.iter().all(|col| col[row].is_some()) {
                dates.push(date);
                if let Some(close) = filled[reference_idx][row] {
                    closes.push(close);
                }
            }
        }

        if dates.is_empty() {
            return Err(PipelineError::EmptyDataset {
                stage: "price cleaning",
            });
        }
        Ok((dates, closes))
    }
}
