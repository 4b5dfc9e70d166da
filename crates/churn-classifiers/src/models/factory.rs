use std::fmt;
use std::str::FromStr;

use crate::config::ModelConfig;
use crate::error::ChurnError;
use crate::models::baseline::MajorityClassBaseline;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::logistic::LogisticRegression;

/// The classifier variants the pipeline can train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Baseline,
    LogisticRegression,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Baseline => f.write_str("most_frequent"),
            ModelKind::LogisticRegression => f.write_str("logistic_regression"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "most_frequent" | "baseline" => Ok(ModelKind::Baseline),
            "logistic_regression" | "logreg" => Ok(ModelKind::LogisticRegression),
            _ => Err(ChurnError::UnknownModel(s.to_string())),
        }
    }
}

/// Build an unfitted boxed classifier.
pub fn build_model(kind: ModelKind, config: &ModelConfig) -> Box<dyn ClassifierModel> {
    match kind {
        ModelKind::Baseline => Box::new(MajorityClassBaseline::new()),
        ModelKind::LogisticRegression => Box::new(LogisticRegression::new(config.clone())),
    }
}
