//! Discrimination metrics on the held-out partition.
//!
//! Read-only over both the artifact and the test set: AUC-ROC over
//! probabilities plus a per-class precision/recall/F1 report over
//! thresholded labels. A single-class test set yields an undefined AUC
//! in the report rather than a failure.

use std::cmp::Ordering;
use std::fmt;

use crate::application::classifier::ModelArtifact;
use crate::domain::errors::PipelineError;
use crate::domain::types::LabeledDataset;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// `None` when the test set contains a single class.
    pub auc: Option<f64>,
    /// Metrics for class 0 (calm) and class 1 (crash), in that order.
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub total: usize,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>9} {:>9} {:>9}", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (class, m) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>4} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "accuracy: {:.4} ({} rows)", self.accuracy, self.total)?;
        match self.auc {
            Some(auc) => writeln!(f, "AUC-ROC: {auc:.4}"),
            None => writeln!(f, "AUC-ROC: undefined (single class in test set)"),
        }
    }
}

pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        artifact: &ModelArtifact,
        test: &LabeledDataset,
    ) -> Result<EvaluationReport, PipelineError> {
        if test.is_empty() {
            return Err(PipelineError::EmptyDataset { stage: "evaluation" });
        }

        let probs = artifact.predict_probability(test.feature_matrix())?;
        let predicted: Vec<u8> = probs
            .iter()
            .map(|p| u8::from(*p >= artifact.decision_threshold))
            .collect();
        let actual: Vec<u8> = test.rows.iter().map(|r| r.target).collect();

        let auc = auc_roc(&probs, &actual);
        let classes = [
            class_metrics(&predicted, &actual, 0),
            class_metrics(&predicted, &actual, 1),
        ];
        let correct = predicted
            .iter()
            .zip(actual.iter())
            .filter(|(p, a)| p == a)
            .count();

        Ok(EvaluationReport {
            auc,
            classes,
            accuracy: correct as f64 / actual.len() as f64,
            total: actual.len(),
        })
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Tie-aware Mann–Whitney AUC: the probability a random positive is
/// ranked above a random negative. `None` when either class is absent.
pub fn auc_roc(probs: &[f64], targets: &[u8]) -> Option<f64> {
    let positives = targets.iter().filter(|&&t| t == 1).count();
    let negatives = targets.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| probs[a].partial_cmp(&probs[b]).unwrap_or(Ordering::Equal));

    // Average ranks across ties so equal scores contribute 0.5
    let mut ranks = vec![0.0; probs.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && probs[order[j + 1]] == probs[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = targets
        .iter()
        .zip(ranks.iter())
        .filter(|&(&t, _)| t == 1)
        .map(|(_, &r)| r)
        .sum();

    let p = positives as f64;
    let n = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

fn class_metrics(predicted: &[u8], actual: &[u8], class: u8) -> ClassMetrics {
    let tp = predicted
        .iter()
        .zip(actual.iter())
        .filter(|&(&p, &a)| p == class && a == class)
        .count() as f64;
    let predicted_count = predicted.iter().filter(|&&p| p == class).count() as f64;
    let support = actual.iter().filter(|&&a| a == class).count();

    let precision = if predicted_count > 0.0 { tp / predicted_count } else { 0.0 };
    let recall = if support > 0 { tp / support as f64 } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassMetrics {
        precision,
        recall,
        f1,
        support,
    }
}
