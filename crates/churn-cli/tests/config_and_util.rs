//! Integration tests for CLI config parsing and util helpers.

use std::io::Write;
use std::path::PathBuf;

use churn_classifiers::config::{ClassWeight, PipelineConfig, ThresholdStrategy};
use churn_cli::predict::input::PredictConfig;
use churn_cli::train::input::load_pipeline_config;
use churn_cli::util::validate_csv_file;

// ---------------------------------------------------------------------------
// validate_csv_file
// ---------------------------------------------------------------------------

#[test]
fn validate_csv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::File::create(&path).unwrap();
    assert!(validate_csv_file(&path).is_ok());
}

#[test]
fn validate_nonexistent_file_errors() {
    let err = validate_csv_file(&PathBuf::from("/nonexistent/path/data.csv")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/path/data.csv"));
}

// ---------------------------------------------------------------------------
// PipelineConfig defaults & serialization
// ---------------------------------------------------------------------------

#[test]
fn pipeline_config_default_values() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.target_column, "Churn");
    assert_eq!(cfg.test_size, 0.25);
    assert_eq!(cfg.random_seed, 42);
    assert_eq!(cfg.min_recall, 0.70);
    assert_eq!(cfg.min_precision, 0.40);
    assert_eq!(cfg.threshold_strategy, ThresholdStrategy::First);
    assert_eq!(cfg.output_directory, PathBuf::from("models"));
    assert_eq!(cfg.model.class_weight, ClassWeight::Balanced);
}

#[test]
fn pipeline_config_serializes_to_json() {
    let json = serde_json::to_string_pretty(&PipelineConfig::default()).unwrap();
    assert!(json.contains("\"threshold_strategy\": \"first\""));
    assert!(json.contains("\"class_weight\": \"balanced\""));
}

#[test]
fn pipeline_config_round_trips_json() {
    let cfg = PipelineConfig {
        threshold_strategy: ThresholdStrategy::MaxF1,
        min_recall: 0.85,
        ..PipelineConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: PipelineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn pipeline_config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"{{"test_size": 0.2, "output_directory": "out", "model": {{"class_weight": "uniform"}}}}"#
    )
    .unwrap();

    let cfg = load_pipeline_config(&path).unwrap();
    assert_eq!(cfg.test_size, 0.2);
    assert_eq!(cfg.output_directory, PathBuf::from("out"));
    assert_eq!(cfg.model.class_weight, ClassWeight::Uniform);
    assert_eq!(cfg.target_column, "Churn");
}

#[test]
fn pipeline_config_rejects_non_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    std::fs::write(&path, "target_column = Churn").unwrap();
    assert!(load_pipeline_config(&path).is_err());
}

// ---------------------------------------------------------------------------
// PredictConfig defaults
// ---------------------------------------------------------------------------

#[test]
fn predict_config_default_values() {
    let cfg = PredictConfig::default();
    assert_eq!(cfg.model_dir, PathBuf::from("models"));
    assert_eq!(cfg.target_column, "Churn");
    assert!(cfg.output.is_none());
    assert!(!cfg.strict);
}
