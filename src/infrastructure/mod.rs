// Raw vendor price CSV (two-level ticker/field header)
pub mod price_csv;

// Processed feature table CSV (build-features -> train hand-off)
pub mod feature_csv;

// Model artifact persistence (atomic, version-tagged)
pub mod model_store;

pub use model_store::ModelStore;
