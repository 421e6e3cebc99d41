//! Persistence for trained model artifacts.
//!
//! Artifacts are serialized as self-describing JSON (version tag, ordered
//! feature names, threshold, forest) and written to a temporary sibling
//! before an atomic rename, so a concurrent reader never observes a
//! partially written file. Saving overwrites without history; the version
//! tag recorded at save time is logged back at load time.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{info, warn};

use crate::application::classifier::ModelArtifact;
use crate::domain::errors::PipelineError;

#[derive(Debug, Default)]
pub struct ModelStore;

impl ModelStore {
    pub fn new() -> Self {
        Self
    }

    pub fn save(&self, artifact: &ModelArtifact, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        let file = File::create(&tmp)?;
        serde_json::to_writer(BufWriter::new(file), artifact)?;
        fs::rename(&tmp, path)?;

        info!(
            "saved model artifact {} to {}",
            artifact.version,
            path.display()
        );
        Ok(())
    }

    pub fn load(&self, path: &Path) -> Result<ModelArtifact, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::ModelNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))?;
        if artifact.version.is_empty() {
            warn!("artifact at {} carries no version tag", path.display());
        } else {
            info!(
                "loaded model artifact {} from {}",
                artifact.version,
                path.display()
            );
        }
        Ok(artifact)
    }
}
