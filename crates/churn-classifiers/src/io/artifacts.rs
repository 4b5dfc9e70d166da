use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ThresholdStrategy;
use crate::error::{ChurnError, Result};
use crate::models::LogisticRegression;
use crate::stats::ThresholdChoice;

pub const MODEL_FILE: &str = "logreg_model.json";
pub const METADATA_FILE: &str = "logreg_metadata.json";

const MODEL_FORMAT_VERSION: u32 = 1;
const METADATA_FORMAT_VERSION: u32 = 1;

/// Everything needed to reproduce the operating point of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub format_version: u32,
    pub threshold: f64,
    pub threshold_choice: ThresholdChoice,
    pub min_recall: f64,
    pub min_precision: f64,
    pub threshold_strategy: ThresholdStrategy,
    /// Encoded feature columns in training order.
    pub feature_columns: Vec<String>,
    pub trained_at: DateTime<Utc>,
}

impl ModelMetadata {
    pub fn new(
        threshold_choice: ThresholdChoice,
        min_recall: f64,
        min_precision: f64,
        threshold_strategy: ThresholdStrategy,
        feature_columns: Vec<String>,
    ) -> Self {
        Self {
            format_version: METADATA_FORMAT_VERSION,
            threshold: threshold_choice.threshold(),
            threshold_choice,
            min_recall,
            min_precision,
            threshold_strategy,
            feature_columns,
            trained_at: Utc::now(),
        }
    }
}

#[derive(Serialize)]
struct ModelArtifactRef<'a> {
    format_version: u32,
    model: &'a LogisticRegression,
}

#[derive(Deserialize)]
struct ModelArtifact {
    model: LogisticRegression,
}

#[derive(Deserialize)]
struct VersionHeader {
    format_version: u32,
}

/// Locations of the two files written by [`save_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(MODEL_FILE),
            metadata: dir.join(METADATA_FILE),
        }
    }
}

/// Write the fitted model and its metadata as pretty JSON under `outdir`,
/// creating the directory when needed.
pub fn save_artifacts(
    outdir: &Path,
    model: &LogisticRegression,
    metadata: &ModelMetadata,
) -> Result<ArtifactPaths> {
    if !model.is_fitted() {
        return Err(ChurnError::NotFitted("logistic_regression"));
    }
    fs::create_dir_all(outdir)?;
    let paths = ArtifactPaths::in_dir(outdir);

    let artifact = ModelArtifactRef {
        format_version: MODEL_FORMAT_VERSION,
        model,
    };
    fs::write(&paths.model, serde_json::to_string_pretty(&artifact)?)?;
    fs::write(&paths.metadata, serde_json::to_string_pretty(metadata)?)?;

    log::debug!(
        "Saved {} and {}",
        paths.model.display(),
        paths.metadata.display()
    );
    Ok(paths)
}

fn read_versioned(path: &Path, artifact: &'static str, expected: u32) -> Result<String> {
    if !path.exists() {
        return Err(ChurnError::FileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    let header: VersionHeader = serde_json::from_str(&text)?;
    if header.format_version != expected {
        return Err(ChurnError::UnsupportedFormatVersion {
            artifact,
            found: header.format_version,
            expected,
        });
    }
    Ok(text)
}

pub fn load_model(dir: &Path) -> Result<LogisticRegression> {
    let path = dir.join(MODEL_FILE);
    let text = read_versioned(&path, "model", MODEL_FORMAT_VERSION)?;
    let artifact: ModelArtifact = serde_json::from_str(&text)?;
    if !artifact.model.is_fitted() {
        return Err(ChurnError::NotFitted("logistic_regression"));
    }
    Ok(artifact.model)
}

pub fn load_metadata(dir: &Path) -> Result<ModelMetadata> {
    let path = dir.join(METADATA_FILE);
    let text = read_versioned(&path, "metadata", METADATA_FORMAT_VERSION)?;
    Ok(serde_json::from_str(&text)?)
}
