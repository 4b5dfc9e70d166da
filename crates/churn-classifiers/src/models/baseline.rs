use ndarray::{Array1, Array2};

use crate::error::{ChurnError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// Always predicts the class seen most often during `fit`.
#[derive(Debug, Clone, Default)]
pub struct MajorityClassBaseline {
    majority: Option<u8>,
}

impl MajorityClassBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn majority_class(&self) -> Option<u8> {
        self.majority
    }

    fn fitted_class(&self) -> Result<u8> {
        self.majority.ok_or(ChurnError::NotFitted(self.name()))
    }
}

impl ClassifierModel for MajorityClassBaseline {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(ChurnError::LengthMismatch {
                what: "target vector",
                expected: x.nrows(),
                actual: y.len(),
            });
        }
        let positives = y.iter().filter(|&&v| v == 1).count();
        let negatives = y.len() - positives;
        // Ties go to the lower label.
        self.majority = Some(u8::from(positives > negatives));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>> {
        let class = self.fitted_class()?;
        Ok(Array1::from_elem(x.nrows(), class))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let class = self.fitted_class()?;
        Ok(Array1::from_elem(x.nrows(), f64::from(class)))
    }

    fn name(&self) -> &'static str {
        "most_frequent"
    }
}
