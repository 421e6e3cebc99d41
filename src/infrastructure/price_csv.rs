//! Reader for the vendor's raw price CSV.
//!
//! The file carries a two-level column header — one row of tickers, one row
//! of fields — over a date index, e.g.
//!
//! ```csv
//! ,SPY,SPY,VIX,VIX
//! ,Close,Open,Close,Open
//! Date,,,,
//! 2020-01-02,324.87,323.54,12.47,13.46
//! ```
//!
//! Header pairs are flattened to `SPY_Close`-style names and only close
//! columns are kept. Rows whose first cell does not parse as a date (the
//! index-label line some exporters emit) are skipped; empty cells become
//! missing values for the feature builder's forward-fill.

use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

use crate::domain::errors::PipelineError;
use crate::domain::types::{PriceColumn, PriceFrame};

pub fn load_price_frame(path: &Path) -> Result<PriceFrame, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut records = reader.records();

    let tickers = records.next().transpose()?.ok_or_else(missing_header)?;
    let fields = records.next().transpose()?.ok_or_else(missing_header)?;

    // (source column index, flattened name) for every close column
    let close_columns: Vec<(usize, String)> = tickers
        .iter()
        .zip(fields.iter())
        .enumerate()
        .skip(1)
        .filter(|(_, (_, field))| field.contains("Close"))
        .map(|(idx, (ticker, field))| (idx, format!("{ticker}_{field}")))
        .collect();
    if close_columns.is_empty() {
        return Err(PipelineError::InvalidSeries {
            reason: "no close-price columns in header".to_string(),
        });
    }

    let mut dates = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); close_columns.len()];
    for record in records {
        let record = record?;
        let Some(first) = record.get(0) else {
            continue;
        };
        let Ok(date) = first.parse::<NaiveDate>() else {
            continue;
        };
        dates.push(date);
        for (slot, (idx, _)) in close_columns.iter().enumerate() {
            let cell = record.get(*idx).unwrap_or("");
            values[slot].push(cell.trim().parse::<f64>().ok());
        }
    }

    let columns = close_columns
        .into_iter()
        .zip(values)
        .map(|((_, name), values)| PriceColumn { name, values })
        .collect();
    let frame = PriceFrame::new(dates, columns)?;
    info!(
        "loaded {} trading dates, {} close columns from {}",
        frame.dates.len(),
        frame.columns.len(),
        path.display()
    );
    Ok(frame)
}

fn missing_header() -> PipelineError {
    PipelineError::InvalidSeries {
        reason: "missing two-level column header".to_string(),
    }
}
