// Feature engineering (price series -> fixed-schema feature table)
pub mod feature_builder;

// Crash-target derivation from next-day returns
pub mod label_generator;

// Chronological train/test partitioning
pub mod splitter;

// Classifier contract + random-forest implementation
pub mod classifier;

// Held-out discrimination metrics
pub mod evaluator;

// Point-in-time scoring of new feature vectors
pub mod predictor;

pub use classifier::{Classifier, ForestClassifier, ModelArtifact, TaskKind};
pub use evaluator::{EvaluationReport, Evaluator};
pub use feature_builder::FeatureBuilder;
pub use label_generator::LabelGenerator;
pub use predictor::Predictor;
pub use splitter::Splitter;
