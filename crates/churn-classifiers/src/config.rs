use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ChurnError, Result};

/// How an operating threshold is picked among rows meeting both constraints.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStrategy {
    /// First qualifying row in increasing-threshold order.
    #[default]
    First,
    /// Qualifying row with the highest F1.
    MaxF1,
}

impl ThresholdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdStrategy::First => "first",
            ThresholdStrategy::MaxF1 => "max_f1",
        }
    }
}

impl fmt::Display for ThresholdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdStrategy {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "first" => Ok(ThresholdStrategy::First),
            "max_f1" => Ok(ThresholdStrategy::MaxF1),
            _ => Err(ChurnError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Sample weighting used by the logistic regression loss.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Weight each class by `n_samples / (n_classes * class_count)`.
    #[default]
    Balanced,
    Uniform,
}

/// Hyper-parameters of the logistic regression model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub max_iter: usize,
    /// Inverse L2 regularization strength.
    pub c: f64,
    pub tol: f64,
    pub class_weight: ClassWeight,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            c: 1.0,
            tol: 1e-4,
            class_weight: ClassWeight::Balanced,
        }
    }
}

/// Central configuration for a training run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub target_column: String,
    pub test_size: f64,
    pub random_seed: u64,
    pub min_recall: f64,
    pub min_precision: f64,
    pub threshold_strategy: ThresholdStrategy,
    pub output_directory: PathBuf,
    pub model: ModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: "Churn".to_string(),
            test_size: 0.25,
            random_seed: 42,
            min_recall: 0.70,
            min_precision: 0.40,
            threshold_strategy: ThresholdStrategy::First,
            output_directory: PathBuf::from("models"),
            model: ModelConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject settings that would fail later in the pipeline.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ChurnError::InvalidTestSize(self.test_size));
        }
        for (name, value) in [
            ("min_recall", self.min_recall),
            ("min_precision", self.min_precision),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ChurnError::InvalidConstraint { name, value });
            }
        }
        Ok(())
    }
}
