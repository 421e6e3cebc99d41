//! Processed feature-table CSV: date index, the five feature columns in
//! canonical order, and an optional Target column. This is the hand-off
//! format between the feature-build job and the training job.

use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

use crate::domain::errors::PipelineError;
use crate::domain::feature_registry::FEATURE_NAMES;
use crate::domain::types::{FeatureRow, FeatureTable};

pub fn write_feature_table(table: &FeatureTable, path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;

    let with_target = table.rows.iter().any(|r| r.target.is_some());
    let mut header = vec!["Date".to_string()];
    header.extend(FEATURE_NAMES.iter().map(|n| n.to_string()));
    if with_target {
        header.push("Target".to_string());
    }
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![
            row.date.to_string(),
            row.log_ret.to_string(),
            row.vol_30d.to_string(),
            row.rsi.to_string(),
            row.bb_width.to_string(),
            row.trend_signal.to_string(),
        ];
        if with_target {
            record.push(row.target.unwrap_or(0).to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!("wrote {} feature rows to {}", table.len(), path.display());
    Ok(())
}

pub fn read_feature_table(path: &Path) -> Result<FeatureTable, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let mut missing = Vec::new();
    let mut feature_idx = Vec::new();
    for &name in FEATURE_NAMES {
        match position(name) {
            Some(idx) => feature_idx.push(idx),
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(PipelineError::MissingFeature { names: missing });
    }

    let date_idx = position("Date").ok_or(PipelineError::InvalidSeries {
        reason: "feature file has no Date column".to_string(),
    })?;
    let target_idx = position("Target");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let date = parse_cell::<NaiveDate>(&record, date_idx, "Date")?;
        let values: Vec<f64> = feature_idx
            .iter()
            .zip(FEATURE_NAMES.iter())
            .map(|(&idx, &name)| parse_cell::<f64>(&record, idx, name))
            .collect::<Result<_, _>>()?;
        let target = match target_idx {
            Some(idx) => Some(parse_cell::<u8>(&record, idx, "Target")?),
            None => None,
        };
        rows.push(FeatureRow {
            date,
            log_ret: values[0],
            vol_30d: values[1],
            rsi: values[2],
            bb_width: values[3],
            trend_signal: values[4],
            target,
        });
    }

    info!("read {} feature rows from {}", rows.len(), path.display());
    Ok(FeatureTable { rows })
}

fn parse_cell<T: std::str::FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
) -> Result<T, PipelineError> {
    let cell = record.get(idx).unwrap_or("");
    cell.parse::<T>().map_err(|_| PipelineError::InvalidSeries {
        reason: format!("unparseable {name} value: {cell:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(day: u32, target: Option<u8>) -> FeatureRow {
        FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            log_ret: -0.005,
            vol_30d: 0.25,
            rsi: 35.0,
            bb_width: 0.08,
            trend_signal: 0.0,
            target,
        }
    }

    #[test]
    fn test_round_trip_without_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let table = FeatureTable {
            rows: vec![row(2, None), row(3, None)],
        };
        write_feature_table(&table, &path).unwrap();
        let read_back = read_feature_table(&path).unwrap();
        assert_eq!(read_back.rows, table.rows);
    }

    #[test]
    fn test_round_trip_with_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let table = FeatureTable {
            rows: vec![row(2, Some(1)), row(3, Some(0))],
        };
        write_feature_table(&table, &path).unwrap();
        let read_back = read_feature_table(&path).unwrap();
        assert_eq!(read_back.rows[0].target, Some(1));
        assert_eq!(read_back.rows[1].target, Some(0));
    }

    #[test]
    fn test_missing_feature_column_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Date,SPY_Log_Ret,SPY_Vol_30d,BB_Width,Trend_Signal").unwrap();
        writeln!(file, "2024-01-02,-0.005,0.25,0.08,0").unwrap();
        drop(file);

        match read_feature_table(&path) {
            Err(PipelineError::MissingFeature { names }) => {
                assert_eq!(names, vec!["RSI".to_string()]);
            }
            other => panic!("expected MissingFeature, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = read_feature_table(Path::new("data/processed/absent.csv"));
        assert!(matches!(result, Err(PipelineError::MissingFile { .. })));
    }

    #[test]
    fn test_parent_directories_created_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/features.csv");
        let table = FeatureTable {
            rows: vec![row(2, None)],
        };
        write_feature_table(&table, &path).unwrap();
        assert!(path.exists());
    }
}
