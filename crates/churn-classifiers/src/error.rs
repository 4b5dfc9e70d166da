use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChurnError>;

/// Errors raised while loading, preparing, fitting or persisting churn data.
#[derive(Debug, Error)]
pub enum ChurnError {
    #[error("CSV not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Target column '{target}' not found. Columns: {available:?}")]
    MissingColumn {
        target: String,
        available: Vec<String>,
    },

    #[error("Unexpected target values after mapping. Got: {0:?}")]
    LabelEncoding(Vec<String>),

    #[error("{what}: expected length {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{0}' is still categorical; one-hot encode it before building a matrix")]
    NonNumericColumn(String),

    #[error("Column '{column}' has {count} missing values")]
    MissingValues { column: String, count: usize },

    #[error("test_size must be in (0, 1), got {0}")]
    InvalidTestSize(f64),

    #[error("{name} must be in [0, 1], got {value}")]
    InvalidConstraint { name: &'static str, value: f64 },

    #[error("Unknown threshold strategy '{0}'. Valid options are: first, max_f1")]
    UnknownStrategy(String),

    #[error("Unknown model type '{0}'. Valid options are: most_frequent, logistic_regression")]
    UnknownModel(String),

    #[error("Class {class} has no examples in the {partition} set")]
    EmptyClass {
        class: u8,
        partition: &'static str,
    },

    #[error("y_true contains no positive samples; recall is undefined")]
    NoPositiveSamples,

    #[error("Precision-recall table is empty")]
    EmptyTable,

    #[error("Got {names} feature names for a model with {coefficients} coefficients")]
    FeatureCountMismatch { names: usize, coefficients: usize },

    #[error("Feature columns do not match training schema (missing: {missing:?}, unexpected: {unexpected:?}, order differs: {reordered})")]
    FeatureSchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
        reordered: bool,
    },

    #[error("Model '{0}' has not been fitted")]
    NotFitted(&'static str),

    #[error("Model '{0}' does not expose linear coefficients")]
    NoCoefficients(&'static str),

    #[error("Unsupported {artifact} format version {found} (expected {expected})")]
    UnsupportedFormatVersion {
        artifact: &'static str,
        found: u32,
        expected: u32,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
