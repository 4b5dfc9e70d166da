//! IO utilities for loading customer tables and persisting trained artifacts.

pub mod artifacts;
pub mod telco_csv;

pub use artifacts::{
    load_metadata, load_model, save_artifacts, ArtifactPaths, ModelMetadata, METADATA_FILE,
    MODEL_FILE,
};
pub use telco_csv::{load_telco_csv, write_predictions, PredictionRow};
