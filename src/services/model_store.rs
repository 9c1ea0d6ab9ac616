use crate::core::classifier::{Classifier, MatchModel};
use crate::error::{MatchError, Result};
use crate::models::{FeatureVector, FEATURE_NAMES};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Persist a fitted model as JSON, creating parent directories as needed
pub fn save<P: AsRef<Path>>(model: &MatchModel, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, model)?;

    tracing::info!("Model {} saved to {}", model.id, path.display());
    Ok(())
}

/// Load a model artifact and check it was trained on the current feature layout
pub fn load<P: AsRef<Path>>(path: P) -> Result<MatchModel> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MatchError::ModelLoad(format!(
            "model file not found: {}",
            path.display()
        )));
    }

    let reader = BufReader::new(File::open(path)?);
    let model: MatchModel = serde_json::from_reader(reader)
        .map_err(|e| MatchError::ModelLoad(format!("{}: {}", path.display(), e)))?;

    if model.feature_names != FEATURE_NAMES {
        return Err(MatchError::ModelLoad(format!(
            "model was trained on features {:?}",
            model.feature_names
        )));
    }
    if model.n_features() != FeatureVector::LEN {
        return Err(MatchError::ModelShape {
            expected: FeatureVector::LEN,
            actual: model.n_features(),
        });
    }

    tracing::info!(
        "Loaded model {} (trained {}) from {}",
        model.id,
        model.trained_at,
        path.display()
    );
    Ok(model)
}
