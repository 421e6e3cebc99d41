//! Classifier contract and the random-forest implementation behind it.
//!
//! The trait declares its task kind as a first-class part of the contract,
//! so evaluation code can rely on it without patching metadata onto a
//! trained model after the fact.
//!
//! The probability model is a forest regressor fit on 0/1 targets: its
//! prediction is the mean leaf vote, a genuine score in `[0, 1]`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::info;

use crate::config::PipelineConfig;
use crate::domain::errors::PipelineError;
use crate::domain::feature_registry;
use crate::domain::types::LabeledDataset;

/// What a trained model is for. Declared up front on the trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    BinaryClassification,
}

/// Train/predict contract the pipeline relies on. The evaluation set
/// passed to [`Classifier::train`] drives early stopping and must be the
/// splitter's test partition, never the training partition.
pub trait Classifier {
    fn task_kind(&self) -> TaskKind;

    fn train(
        &self,
        train: &LabeledDataset,
        eval: &LabeledDataset,
    ) -> Result<ModelArtifact, PipelineError>;
}

/// Immutable trained model plus the metadata needed to score safely:
/// the exact ordered feature-name list it was trained on, the decision
/// threshold, and a version tag recorded at save time.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub feature_names: Vec<String>,
    pub decision_threshold: f64,
    pub n_trees: usize,
    forest: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>,
}

impl ModelArtifact {
    /// Crash probabilities for a batch of rows in canonical feature order.
    pub fn predict_probability(&self, rows: Vec<Vec<f64>>) -> Result<Vec<f64>, PipelineError> {
        let matrix = DenseMatrix::from_2d_vec(&rows).map_err(|e| PipelineError::Training {
            reason: format!("matrix creation failed: {e}"),
        })?;
        let raw = self
            .forest
            .predict(&matrix)
            .map_err(|e| PipelineError::Training {
                reason: format!("prediction failed: {e}"),
            })?;
        Ok(raw.into_iter().map(|p| p.clamp(0.0, 1.0)).collect())
    }

    /// Probabilities thresholded at the artifact's decision threshold.
    pub fn predict_labels(&self, rows: Vec<Vec<f64>>) -> Result<Vec<u8>, PipelineError> {
        let probs = self.predict_probability(rows)?;
        Ok(probs
            .into_iter()
            .map(|p| u8::from(p >= self.decision_threshold))
            .collect())
    }
}

/// Smartcore random forest with positive-class weighting and early
/// stopping on held-out log-loss.
pub struct ForestClassifier {
    positive_class_weight: u32,
    decision_threshold: f64,
    max_depth: u16,
    min_samples_split: usize,
}

/// Staged tree counts scored against the evaluation partition; growth
/// stops as soon as eval loss stops improving.
const TREE_SCHEDULE: &[usize] = &[25, 50, 75, 100];

impl ForestClassifier {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            positive_class_weight: config.positive_class_weight,
            decision_threshold: config.decision_threshold,
            max_depth: 4,
            min_samples_split: 5,
        }
    }
}

impl Classifier for ForestClassifier {
    fn task_kind(&self) -> TaskKind {
        TaskKind::BinaryClassification
    }

    fn train(
        &self,
        train: &LabeledDataset,
        eval: &LabeledDataset,
    ) -> Result<ModelArtifact, PipelineError> {
        if train.is_empty() || eval.is_empty() {
            return Err(PipelineError::EmptyDataset { stage: "training" });
        }

        // Class-imbalance handling: crash rows are replicated so the forest
        // sees them at the configured weight (integer sample weighting).
        let mut x: Vec<Vec<f64>> = Vec::new();
        let mut y: Vec<f64> = Vec::new();
        for row in &train.rows {
            let copies = if row.target == 1 {
                self.positive_class_weight.max(1)
            } else {
                1
            };
            for _ in 0..copies {
                x.push(row.features.clone());
                y.push(f64::from(row.target));
            }
        }

        let x_matrix = DenseMatrix::from_2d_vec(&x).map_err(|e| PipelineError::Training {
            reason: format!("matrix creation failed: {e}"),
        })?;
        let eval_features = eval.feature_matrix();
        let eval_matrix =
            DenseMatrix::from_2d_vec(&eval_features).map_err(|e| PipelineError::Training {
                reason: format!("matrix creation failed: {e}"),
            })?;
        let eval_targets = eval.targets();

        info!(
            "training forest on {} rows ({} after positive replication)",
            train.len(),
            x.len()
        );

        let mut best: Option<(f64, usize, ForestModel)> = None;
        for &n_trees in TREE_SCHEDULE {
            let params = RandomForestRegressorParameters::default()
                .with_n_trees(n_trees)
                .with_max_depth(self.max_depth)
                .with_min_samples_split(self.min_samples_split);
            let forest = RandomForestRegressor::fit(&x_matrix, &y, params).map_err(|e| {
                PipelineError::Training {
                    reason: e.to_string(),
                }
            })?;
            let probs = forest
                .predict(&eval_matrix)
                .map_err(|e| PipelineError::Training {
                    reason: format!("eval prediction failed: {e}"),
                })?;
            let loss = log_loss(&probs, &eval_targets);
            info!("{} trees: eval log-loss {:.6}", n_trees, loss);

            match &best {
                Some((best_loss, best_trees, _)) if loss >= *best_loss => {
                    info!("eval loss stopped improving, keeping {} trees", best_trees);
                    break;
                }
                _ => best = Some((loss, n_trees, forest)),
            }
        }

        let (_, n_trees, forest) = best.ok_or(PipelineError::Training {
            reason: "no candidate model trained".to_string(),
        })?;

        Ok(ModelArtifact {
            version: format!(
                "crashrisk-{}-{}",
                env!("CARGO_PKG_VERSION"),
                Utc::now().format("%Y%m%dT%H%M%SZ")
            ),
            feature_names: feature_registry::feature_names(),
            decision_threshold: self.decision_threshold,
            n_trees,
            forest,
        })
    }
}

type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Binary cross-entropy, probabilities clamped away from 0 and 1.
fn log_loss(probs: &[f64], targets: &[f64]) -> f64 {
    const EPS: f64 = 1e-7;
    let n = probs.len().max(1) as f64;
    probs
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
        .sum::<f64>()
        / n
}
