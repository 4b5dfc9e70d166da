use std::fmt::Write;

use serde::Serialize;

use crate::error::{ChurnError, Result};
use crate::models::ClassifierModel;

/// One feature's linear weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientRow {
    pub feature: String,
    pub coef: f64,
    pub abs_coef: f64,
}

/// The `top_k` features by absolute coefficient, largest first.
///
/// Equal magnitudes keep their feature order. `top_k` larger than the number
/// of features returns every feature.
pub fn top_coefficients(
    model: &dyn ClassifierModel,
    feature_names: &[String],
    top_k: usize,
) -> Result<Vec<CoefficientRow>> {
    let coef = model
        .coefficients()
        .ok_or_else(|| ChurnError::NoCoefficients(model.name()))?;
    if coef.len() != feature_names.len() {
        return Err(ChurnError::FeatureCountMismatch {
            names: feature_names.len(),
            coefficients: coef.len(),
        });
    }

    let mut rows: Vec<CoefficientRow> = feature_names
        .iter()
        .zip(coef.iter())
        .map(|(name, &c)| CoefficientRow {
            feature: name.clone(),
            coef: c,
            abs_coef: c.abs(),
        })
        .collect();
    rows.sort_by(|a, b| b.abs_coef.total_cmp(&a.abs_coef));
    rows.truncate(top_k);
    Ok(rows)
}

/// Render rows as an aligned `feature / coef / abs_coef` table.
pub fn format_coefficients(rows: &[CoefficientRow]) -> String {
    let width = rows
        .iter()
        .map(|r| r.feature.len())
        .chain(std::iter::once("feature".len()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$} {:>10} {:>10}", "feature", "coef", "abs_coef", width = width);
    for row in rows {
        let _ = writeln!(
            out,
            "{:<width$} {:>10.4} {:>10.4}",
            row.feature,
            row.coef,
            row.abs_coef,
            width = width
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::models::{LogisticRegression, MajorityClassBaseline};
    use ndarray::array;

    fn fitted(coef: ndarray::Array1<f64>) -> LogisticRegression {
        let mut model = LogisticRegression::new(ModelConfig::default());
        model.coefficients = Some(coef);
        model.intercept = Some(0.0);
        model
    }

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranks_by_magnitude() {
        let model = fitted(array![0.5, -2.0, 1.0]);
        let rows = top_coefficients(&model, &names(&["a", "b", "c"]), 2).unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, vec!["b", "c"]);
        assert_eq!(rows[0].coef, -2.0);
        assert_eq!(rows[0].abs_coef, 2.0);
    }

    #[test]
    fn top_k_beyond_length_returns_all() {
        let model = fitted(array![0.1, 0.2]);
        let rows = top_coefficients(&model, &names(&["a", "b"]), 20).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn equal_magnitudes_keep_feature_order() {
        let model = fitted(array![1.0, -1.0, 1.0]);
        let rows = top_coefficients(&model, &names(&["x", "y", "z"]), 3).unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn name_count_mismatch_errors() {
        let model = fitted(array![1.0, 2.0]);
        assert!(matches!(
            top_coefficients(&model, &names(&["a"]), 5),
            Err(ChurnError::FeatureCountMismatch { names: 1, coefficients: 2 })
        ));
    }

    #[test]
    fn baseline_has_no_coefficients() {
        let model = MajorityClassBaseline::new();
        assert!(matches!(
            top_coefficients(&model, &names(&["a"]), 5),
            Err(ChurnError::NoCoefficients(_))
        ));
    }

    #[test]
    fn table_has_header_and_rows() {
        let model = fitted(array![0.25, -1.5]);
        let rows = top_coefficients(&model, &names(&["tenure", "Contract_Two year"]), 2).unwrap();
        let text = format_coefficients(&rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("feature"));
        assert!(lines[1].starts_with("Contract_Two year"));
        assert!(lines[1].ends_with("-1.5000     1.5000"));
    }
}
