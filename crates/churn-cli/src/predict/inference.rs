use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};

use churn_classifiers::data_handling::FeatureFrame;
use churn_classifiers::io::{load_metadata, load_model, load_telco_csv, write_predictions, PredictionRow};
use churn_classifiers::models::ClassifierModel;
use churn_classifiers::preprocessing::{
    align_to_feature_columns, ensure_feature_columns, one_hot_encode, prepare_features,
};
use churn_classifiers::stats::apply_threshold;

use crate::predict::input::PredictConfig;

/// Score every usable row of the input CSV and write
/// `customerID,probability,prediction` rows.
pub fn run_inference(config: &PredictConfig) -> Result<Vec<PredictionRow>> {
    let metadata = load_metadata(&config.model_dir).with_context(|| {
        format!("Failed to load metadata from {}", config.model_dir.display())
    })?;
    let model = load_model(&config.model_dir)
        .with_context(|| format!("Failed to load model from {}", config.model_dir.display()))?;
    log::info!(
        "Loaded model with {} features, threshold {}",
        metadata.feature_columns.len(),
        metadata.threshold_choice
    );

    let table = load_telco_csv(&config.csv)
        .with_context(|| format!("Failed to load {}", config.csv.display()))?;
    let prepared = prepare_features(&table, &config.target_column)?;
    log::info!("Scoring {} rows", prepared.ids.len());

    let encoded = one_hot_encode(&prepared.x, false);
    if config.strict {
        check_schema(&encoded, &metadata.feature_columns)?;
    }

    let (x, alignment) = align_to_feature_columns(&encoded, &metadata.feature_columns)?;
    if !alignment.is_exact() {
        if !alignment.missing.is_empty() {
            log::warn!(
                "{} training columns absent from input, filled with 0: {:?}",
                alignment.missing.len(),
                alignment.missing
            );
        }
        log::debug!("Ignored input columns: {:?}", alignment.ignored);
    }

    let proba = model.predict_proba(&x)?;
    let labels = apply_threshold(&proba, metadata.threshold);

    let rows: Vec<PredictionRow> = prepared
        .ids
        .into_iter()
        .zip(proba.iter().zip(labels.iter()))
        .map(|(customer_id, (&probability, &prediction))| PredictionRow {
            customer_id,
            probability,
            prediction,
        })
        .collect();

    match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_predictions(BufWriter::new(file), &rows)?;
            log::info!("Wrote {} predictions to {}", rows.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_predictions(&mut handle, &rows)?;
            handle.flush()?;
        }
    }

    Ok(rows)
}

/// The pinned columns found in the input must appear in full and in the
/// training order. Reference categories of the training encoding are
/// expected extras and are not checked.
fn check_schema(encoded: &FeatureFrame, feature_columns: &[String]) -> Result<()> {
    let pinned: HashSet<&String> = feature_columns.iter().collect();
    let present: Vec<String> = encoded
        .column_names()
        .iter()
        .filter(|c| pinned.contains(c))
        .cloned()
        .collect();
    ensure_feature_columns(feature_columns, &present)?;
    Ok(())
}
