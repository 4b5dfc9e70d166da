use ndarray::{Array1, Array2};

use crate::error::Result;

/// Contract shared by the churn classifiers. Labels use 1 for churn and 0
/// for stay.
pub trait ClassifierModel {
    /// Fit the model on rows of `x` labelled by `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()>;

    /// Hard 0/1 predictions.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>>;

    /// Probability of the positive class for every row.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Linear coefficients, one per feature column, when the model has them.
    fn coefficients(&self) -> Option<&Array1<f64>> {
        None
    }

    /// Optional human readable name for the model
    fn name(&self) -> &'static str {
        "classifier"
    }
}
