//! Point-in-time scoring of one new feature vector.
//!
//! The caller supplies a name→value mapping in any key order; values are
//! reordered into the artifact's recorded training order before prediction.
//! A structurally wrong order would yield silently incorrect probabilities,
//! so the key set must match the artifact exactly — absent keys are named
//! in the error and never imputed.

use std::collections::HashMap;
use std::path::Path;

use crate::application::classifier::ModelArtifact;
use crate::domain::errors::PipelineError;
use crate::domain::types::RiskScore;
use crate::infrastructure::model_store::ModelStore;

pub struct Predictor {
    artifact: ModelArtifact,
}

impl Predictor {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Loads the artifact through the store; an unreadable artifact
    /// surfaces as [`PipelineError::ModelNotFound`].
    pub fn load(store: &ModelStore, path: &Path) -> Result<Self, PipelineError> {
        Ok(Self::new(store.load(path)?))
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn predict(&self, request: &HashMap<String, f64>) -> Result<RiskScore, PipelineError> {
        let mut ordered = Vec::with_capacity(self.artifact.feature_names.len());
        let mut missing = Vec::new();
        for name in &self.artifact.feature_names {
            match request.get(name) {
                Some(value) => ordered.push(*value),
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(PipelineError::MissingFeature { names: missing });
        }

        let mut unexpected: Vec<String> = request
            .keys()
            .filter(|key| !self.artifact.feature_names.contains(key))
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            unexpected.sort();
            return Err(PipelineError::UnexpectedFeature { names: unexpected });
        }

        let probs = self.artifact.predict_probability(vec![ordered])?;
        let probability = probs.first().copied().ok_or(PipelineError::Training {
            reason: "no prediction returned".to_string(),
        })?;
        Ok(RiskScore {
            probability,
            label: u8::from(probability >= self.artifact.decision_threshold),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::classifier::{Classifier, ForestClassifier};
    use crate::config::PipelineConfig;
    use crate::domain::feature_registry::FEATURE_NAMES;
    use crate::domain::types::{LabeledDataset, LabeledRow};
    use chrono::NaiveDate;

    fn trained_predictor() -> Predictor {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows: Vec<LabeledRow> = (0..50)
            .map(|i| {
                let target = u8::from(i % 5 == 0);
                let features = if target == 1 {
                    vec![-0.02, 0.40, 25.0, 0.10, 0.0]
                } else {
                    vec![0.005, 0.12, 55.0, 0.03, 1.0]
                };
                LabeledRow {
                    date: start + chrono::Duration::days(i as i64),
                    features,
                    target,
                }
            })
            .collect();
        let (train, test) = {
            let mut rows = rows;
            let test = rows.split_off(40);
            (LabeledDataset { rows }, LabeledDataset { rows: test })
        };
        let artifact = ForestClassifier::new(&PipelineConfig::default())
            .train(&train, &test)
            .unwrap();
        Predictor::new(artifact)
    }

    fn request(values: &[(&str, f64)]) -> HashMap<String, f64> {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_prediction_is_independent_of_key_order() {
        let predictor = trained_predictor();
        let forwards = request(&[
            ("SPY_Log_Ret", -0.005),
            ("SPY_Vol_30d", 0.25),
            ("RSI", 35.0),
            ("BB_Width", 0.08),
            ("Trend_Signal", 0.0),
        ]);
        let backwards = request(&[
            ("Trend_Signal", 0.0),
            ("BB_Width", 0.08),
            ("RSI", 35.0),
            ("SPY_Vol_30d", 0.25),
            ("SPY_Log_Ret", -0.005),
        ]);

        let a = predictor.predict(&forwards).unwrap();
        let b = predictor.predict(&backwards).unwrap();
        assert_eq!(a, b);
        assert!((0.0..=1.0).contains(&a.probability));
    }

    #[test]
    fn test_missing_feature_is_named() {
        let predictor = trained_predictor();
        let incomplete = request(&[
            ("SPY_Log_Ret", -0.005),
            ("SPY_Vol_30d", 0.25),
            ("BB_Width", 0.08),
            ("Trend_Signal", 0.0),
        ]);
        match predictor.predict(&incomplete) {
            Err(PipelineError::MissingFeature { names }) => {
                assert_eq!(names, vec!["RSI".to_string()]);
            }
            other => panic!("expected MissingFeature, got {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_feature_rejected() {
        let predictor = trained_predictor();
        let mut extra = request(&[
            ("SPY_Log_Ret", -0.005),
            ("SPY_Vol_30d", 0.25),
            ("RSI", 35.0),
            ("BB_Width", 0.08),
            ("Trend_Signal", 0.0),
        ]);
        extra.insert("VIX_Close".to_string(), 18.0);
        match predictor.predict(&extra) {
            Err(PipelineError::UnexpectedFeature { names }) => {
                assert_eq!(names, vec!["VIX_Close".to_string()]);
            }
            other => panic!("expected UnexpectedFeature, got {other:?}"),
        }
    }

    #[test]
    fn test_label_matches_threshold() {
        let predictor = trained_predictor();
        let crash_like = request(&[
            ("SPY_Log_Ret", -0.02),
            ("SPY_Vol_30d", 0.40),
            ("RSI", 25.0),
            ("BB_Width", 0.10),
            ("Trend_Signal", 0.0),
        ]);
        let score = predictor.predict(&crash_like).unwrap();
        assert_eq!(
            score.label,
            u8::from(score.probability >= predictor.artifact().decision_threshold)
        );
    }

    #[test]
    fn test_artifact_contract_matches_registry() {
        let predictor = trained_predictor();
        assert_eq!(predictor.artifact().feature_names, FEATURE_NAMES.to_vec());
    }
}
