//! End-to-end pipeline scenario: a 400-day synthetic price series with a
//! single known -2% crash on day 350, driven through the CSV hand-offs,
//! labeling, chronological split, training, evaluation, persistence and
//! scoring.

use chrono::{Duration, NaiveDate};
use crashrisk::application::{
    Classifier, Evaluator, FeatureBuilder, ForestClassifier, LabelGenerator, Predictor, Splitter,
};
use crashrisk::config::PipelineConfig;
use crashrisk::domain::errors::PipelineError;
use crashrisk::infrastructure::{ModelStore, feature_csv, price_csv};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

const DAYS: usize = 400;
const CRASH_DAY: usize = 350;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

/// Near-flat series (log returns within +-0.1%) except a -2% drop on
/// `CRASH_DAY`. Noise keeps the indicators away from degenerate 0/0 cases
/// without ever crossing the -1% crash threshold.
fn synthetic_prices() -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut prices = Vec::with_capacity(DAYS);
    let mut price = 400.0_f64;
    prices.push(price);
    for day in 1..DAYS {
        let log_ret = if day == CRASH_DAY {
            -0.02
        } else {
            (rng.random::<f64>() - 0.5) * 0.002
        };
        price *= log_ret.exp();
        prices.push(price);
    }
    prices
}

fn write_raw_csv(path: &Path, prices: &[f64]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, ",SPY,SPY").unwrap();
    writeln!(file, ",Close,Open").unwrap();
    writeln!(file, "Date,,").unwrap();
    for (day, close) in prices.iter().enumerate() {
        let date = start_date() + Duration::days(day as i64);
        writeln!(file, "{date},{close},{}", close * 0.999).unwrap();
    }
}

#[test]
fn test_full_pipeline_from_raw_prices_to_risk_score() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("raw/market_data.csv");
    std::fs::create_dir_all(raw_path.parent().unwrap()).unwrap();
    write_raw_csv(&raw_path, &synthetic_prices());

    let mut config = PipelineConfig::default();
    config.raw_data_path = raw_path;
    config.features_path = dir.path().join("processed/market_features.csv");
    config.model_path = dir.path().join("models/crash_risk_model.json");

    // Feature build through the CSV hand-off, as the separate jobs run it
    let frame = price_csv::load_price_frame(&config.raw_data_path).unwrap();
    let built = FeatureBuilder::new(&config).build(&frame).unwrap();
    feature_csv::write_feature_table(&built, &config.features_path).unwrap();
    let table = feature_csv::read_feature_table(&config.features_path).unwrap();
    assert_eq!(table.rows, built.rows);

    // Labels: exactly one crash day, on the row before the drop
    let labeled = LabelGenerator::new(&config).label(&table).unwrap();
    let crash_eve = start_date() + Duration::days((CRASH_DAY - 1) as i64);
    for row in &labeled.rows {
        if row.date == crash_eve {
            assert_eq!(row.target, 1, "day before the -2% drop must be labeled 1");
        } else {
            assert_eq!(row.target, 0, "flat day {} must be labeled 0", row.date);
        }
    }

    // Chronological split keeps the crash in the held-out tail
    let split = Splitter::new(&config).split(labeled).unwrap();
    let last_train = split.train.rows.last().unwrap().date;
    let first_test = split.test.rows.first().unwrap().date;
    assert!(last_train < first_test);
    assert!(split.test.rows.iter().any(|r| r.target == 1));

    // Train with early stopping on the held-out tail, then evaluate
    let artifact = ForestClassifier::new(&config)
        .train(&split.train, &split.test)
        .unwrap();
    let report = Evaluator::new().evaluate(&artifact, &split.test).unwrap();
    let auc = report.auc.expect("both classes present, AUC must be defined");
    assert!(auc.is_finite());
    assert!((0.0..=1.0).contains(&auc));

    // Persist and score through the store
    let store = ModelStore::new();
    store.save(&artifact, &config.model_path).unwrap();
    let predictor = Predictor::load(&store, &config.model_path).unwrap();

    let request: HashMap<String, f64> = [
        ("SPY_Log_Ret".to_string(), -0.005),
        ("SPY_Vol_30d".to_string(), 0.25),
        ("RSI".to_string(), 35.0),
        ("BB_Width".to_string(), 0.08),
        ("Trend_Signal".to_string(), 0.0),
    ]
    .into_iter()
    .collect();
    let score = predictor.predict(&request).unwrap();
    assert!((0.0..=1.0).contains(&score.probability));
    assert!(score.label == 0 || score.label == 1);

    // Same mapping, reversed insertion order: identical score
    let mut pairs: Vec<(String, f64)> = request.clone().into_iter().collect();
    pairs.reverse();
    let reversed: HashMap<String, f64> = pairs.into_iter().collect();
    assert_eq!(predictor.predict(&reversed).unwrap(), score);

    // A request lacking RSI is rejected by name, never imputed
    let mut incomplete = request;
    incomplete.remove("RSI");
    match predictor.predict(&incomplete) {
        Err(PipelineError::MissingFeature { names }) => {
            assert_eq!(names, vec!["RSI".to_string()]);
        }
        other => panic!("expected MissingFeature, got {other:?}"),
    }
}

#[test]
fn test_short_history_fails_to_split_not_train() {
    // 55 days survive warm-up as only a handful of labeled rows, too few
    // for a meaningful held-out partition.
    let mut config = PipelineConfig::default();
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("market_data.csv");
    write_raw_csv(&raw_path, &synthetic_prices()[..55]);
    config.raw_data_path = raw_path;

    let frame = price_csv::load_price_frame(&config.raw_data_path).unwrap();
    let table = FeatureBuilder::new(&config).build(&frame).unwrap();
    let labeled = LabelGenerator::new(&config).label(&table).unwrap();
    let result = Splitter::new(&config).split(labeled);
    assert!(matches!(
        result,
        Err(PipelineError::InsufficientData { .. })
    ));
}
