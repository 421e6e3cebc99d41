use crate::domain::types::FeatureRow;

/// Ordered list of feature names.
/// This order is the training-time contract recorded in every artifact and
/// validated at prediction time. Any change here is a breaking change for
/// persisted models.
pub const FEATURE_NAMES: &[&str] = &[
    "SPY_Log_Ret",
    "SPY_Vol_30d",
    "RSI",
    "BB_Width",
    "Trend_Signal",
];

/// Converts a feature row into a vector in canonical `FEATURE_NAMES` order.
pub fn row_to_vector(row: &FeatureRow) -> Vec<f64> {
    vec![
        row.log_ret,
        row.vol_30d,
        row.rsi,
        row.bb_width,
        row.trend_signal,
    ]
}

/// Owned copy of the canonical ordered name list, as stored in artifacts.
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|n| n.to_string()).collect()
}
