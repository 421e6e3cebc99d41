// Pipeline error taxonomy
pub mod errors;

// Canonical feature-name order (training/inference contract)
pub mod feature_registry;

// Core data model: price frames, feature tables, labeled datasets, scores
pub mod types;
