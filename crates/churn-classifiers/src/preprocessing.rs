//! Feature/target preparation for the churn table.
//!
//! Splits the raw table into features and labels, coerces the text-encoded
//! numeric column, encodes labels, one-hot encodes categorical columns and
//! aligns encoded frames against a pinned feature list.
use std::collections::{BTreeSet, HashSet};

use ndarray::{Array1, Array2};

use crate::data_handling::{mask_indices, parse_numeric, Column, FeatureFrame, RawTable};
use crate::error::{ChurnError, Result};

/// Customer identifier, never used as a feature.
pub const ID_COLUMN: &str = "customerID";

/// Numeric column stored as text (blank for new customers).
pub const NUMERIC_TEXT_COLUMN: &str = "TotalCharges";

const POSITIVE_LABEL: &str = "Yes";
const NEGATIVE_LABEL: &str = "No";

/// Split a raw table into a feature frame and raw target labels.
///
/// The target and the customer id are dropped from the features.
pub fn make_xy(table: &RawTable, target: &str) -> Result<(FeatureFrame, Vec<String>)> {
    let Some(target_idx) = table.column_index(target) else {
        return Err(ChurnError::MissingColumn {
            target: target.to_string(),
            available: table.headers.clone(),
        });
    };
    let x = table.to_frame(&[target, ID_COLUMN]);
    let y = table.column_values(target_idx);
    Ok((x, y))
}

/// Coerce `TotalCharges` to numeric, drop rows where it is missing and map
/// labels Yes/No to 1/0.
///
/// Labels are checked after the row filter, so an unmappable label on a row
/// that is dropped for its charges never surfaces.
pub fn clean_telco(x: FeatureFrame, y: Vec<String>) -> Result<(FeatureFrame, Array1<u8>)> {
    if x.nrows() != y.len() {
        return Err(ChurnError::LengthMismatch {
            what: "target vector",
            expected: x.nrows(),
            actual: y.len(),
        });
    }

    let (x, y) = match coerce_numeric(&x, NUMERIC_TEXT_COLUMN)? {
        Some((coerced, mask)) => {
            let keep = mask_indices(&mask);
            let dropped = y.len() - keep.len();
            if dropped > 0 {
                log::info!(
                    "Dropped {} rows with missing {} ({} remaining)",
                    dropped,
                    NUMERIC_TEXT_COLUMN,
                    keep.len()
                );
            }
            let y = keep.iter().map(|&i| y[i].clone()).collect::<Vec<_>>();
            (coerced.select_rows(&keep), y)
        }
        None => (x, y),
    };

    let y = encode_labels(&y)?;
    Ok((x, y))
}

/// Map the two-valued label domain onto {0, 1}.
pub fn encode_labels(y: &[String]) -> Result<Array1<u8>> {
    let mut bad: Vec<String> = Vec::new();
    let mut encoded = Vec::with_capacity(y.len());
    for label in y {
        match label.as_str() {
            POSITIVE_LABEL => encoded.push(1u8),
            NEGATIVE_LABEL => encoded.push(0u8),
            other => {
                if !bad.iter().any(|b| b == other) {
                    bad.push(other.to_string());
                }
            }
        }
    }
    if !bad.is_empty() {
        return Err(ChurnError::LabelEncoding(bad));
    }
    Ok(Array1::from_vec(encoded))
}

/// Replace `column` with its numeric coercion and return the mask of rows
/// holding a value. Returns `None` when the column is absent.
fn coerce_numeric(x: &FeatureFrame, column: &str) -> Result<Option<(FeatureFrame, Vec<bool>)>> {
    let Some(values) = x.column(column) else {
        return Ok(None);
    };
    let numeric: Vec<f64> = match values {
        Column::Numeric(v) => v.clone(),
        Column::Categorical(v) => v
            .iter()
            .map(|cell| cell.as_deref().and_then(parse_numeric).unwrap_or(f64::NAN))
            .collect(),
    };
    let mask = numeric.iter().map(|v| !v.is_nan()).collect();
    let mut coerced = x.clone();
    coerced.replace_column(column, Column::Numeric(numeric))?;
    Ok(Some((coerced, mask)))
}

/// Expand every categorical column into `<column>_<category>` indicator
/// columns with categories in sorted order.
///
/// Numeric columns come first in their original order, followed by the
/// indicator blocks. With `drop_first` the first sorted category of every
/// column is left out. Missing categorical values encode as all zeros.
pub fn one_hot_encode(x: &FeatureFrame, drop_first: bool) -> FeatureFrame {
    let mut encoded = FeatureFrame::with_rows(x.nrows());
    let mut indicators: Vec<(String, Column)> = Vec::new();

    for (name, column) in x.columns() {
        match column {
            Column::Numeric(_) => encoded.push_aligned(name.clone(), column.clone()),
            Column::Categorical(values) => {
                let categories: BTreeSet<&str> =
                    values.iter().filter_map(|v| v.as_deref()).collect();
                let skip = usize::from(drop_first);
                for category in categories.into_iter().skip(skip) {
                    let indicator = values
                        .iter()
                        .map(|v| if v.as_deref() == Some(category) { 1.0 } else { 0.0 })
                        .collect();
                    indicators.push((format!("{}_{}", name, category), Column::Numeric(indicator)));
                }
            }
        }
    }

    for (name, column) in indicators {
        encoded.push_aligned(name, column);
    }
    encoded
}

/// Dense row-major matrix of an all-numeric frame.
pub fn to_matrix(x: &FeatureFrame) -> Result<Array2<f64>> {
    let mut matrix = Array2::<f64>::zeros((x.nrows(), x.ncols()));
    for (j, (name, column)) in x.columns().enumerate() {
        let values = numeric_values(name, column)?;
        for (i, &v) in values.iter().enumerate() {
            matrix[[i, j]] = v;
        }
    }
    Ok(matrix)
}

fn numeric_values<'a>(name: &str, column: &'a Column) -> Result<&'a [f64]> {
    let Column::Numeric(values) = column else {
        return Err(ChurnError::NonNumericColumn(name.to_string()));
    };
    let missing = values.iter().filter(|v| v.is_nan()).count();
    if missing > 0 {
        return Err(ChurnError::MissingValues {
            column: name.to_string(),
            count: missing,
        });
    }
    Ok(values)
}

/// Strict check that `actual` has exactly the pinned columns in the pinned
/// order.
pub fn ensure_feature_columns(expected: &[String], actual: &[String]) -> Result<()> {
    if expected == actual {
        return Ok(());
    }
    let expected_set: HashSet<&String> = expected.iter().collect();
    let actual_set: HashSet<&String> = actual.iter().collect();
    let missing: Vec<String> = expected
        .iter()
        .filter(|c| !actual_set.contains(c))
        .cloned()
        .collect();
    let unexpected: Vec<String> = actual
        .iter()
        .filter(|c| !expected_set.contains(c))
        .cloned()
        .collect();
    Err(ChurnError::FeatureSchemaMismatch {
        reordered: missing.is_empty() && unexpected.is_empty(),
        missing,
        unexpected,
    })
}

/// What `align_to_feature_columns` had to change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    /// Pinned columns absent from the input, zero-filled.
    pub missing: Vec<String>,
    /// Input columns not in the pinned list, left out of the matrix.
    pub ignored: Vec<String>,
}

impl Alignment {
    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.ignored.is_empty()
    }
}

/// Build a matrix whose columns follow `feature_columns`.
pub fn align_to_feature_columns(
    x: &FeatureFrame,
    feature_columns: &[String],
) -> Result<(Array2<f64>, Alignment)> {
    let pinned: HashSet<&String> = feature_columns.iter().collect();
    let mut alignment = Alignment {
        ignored: x
            .column_names()
            .iter()
            .filter(|c| !pinned.contains(c))
            .cloned()
            .collect(),
        ..Alignment::default()
    };

    let mut matrix = Array2::<f64>::zeros((x.nrows(), feature_columns.len()));
    for (j, name) in feature_columns.iter().enumerate() {
        match x.column(name) {
            Some(column) => {
                let values = numeric_values(name, column)?;
                for (i, &v) in values.iter().enumerate() {
                    matrix[[i, j]] = v;
                }
            }
            None => alignment.missing.push(name.clone()),
        }
    }
    Ok((matrix, alignment))
}

/// Unlabelled rows cleaned the same way as training rows.
#[derive(Debug, Clone)]
pub struct PreparedFeatures {
    /// Customer id per surviving row, or `row_<n>` when the table has none.
    pub ids: Vec<String>,
    pub x: FeatureFrame,
}

/// Inference-side counterpart of `make_xy` + `clean_telco`: drops the id
/// and target (when present) and rows with missing `TotalCharges`.
pub fn prepare_features(table: &RawTable, target: &str) -> Result<PreparedFeatures> {
    let ids = match table.column_index(ID_COLUMN) {
        Some(idx) => table.column_values(idx),
        None => (0..table.nrows()).map(|i| format!("row_{}", i + 1)).collect(),
    };
    let x = table.to_frame(&[target, ID_COLUMN]);

    match coerce_numeric(&x, NUMERIC_TEXT_COLUMN)? {
        Some((coerced, mask)) => {
            let keep = mask_indices(&mask);
            if keep.len() < ids.len() {
                log::info!(
                    "Skipping {} rows with missing {}",
                    ids.len() - keep.len(),
                    NUMERIC_TEXT_COLUMN
                );
            }
            Ok(PreparedFeatures {
                ids: keep.iter().map(|&i| ids[i].clone()).collect(),
                x: coerced.select_rows(&keep),
            })
        }
        None => Ok(PreparedFeatures { ids, x }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn table() -> RawTable {
        RawTable::new(
            strings(&["customerID", "tenure", "Contract", "TotalCharges", "Churn"]),
            vec![
                strings(&["a", "1", "Month-to-month", "29.85", "No"]),
                strings(&["b", "34", "One year", "1889.5", "No"]),
                strings(&["c", "0", "Two year", " ", "No"]),
                strings(&["d", "2", "Month-to-month", "108.15", "Yes"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn make_xy_drops_target_and_id() {
        let (x, y) = make_xy(&table(), "Churn").unwrap();
        assert_eq!(x.column_names(), &strings(&["tenure", "Contract", "TotalCharges"]));
        assert_eq!(y, strings(&["No", "No", "No", "Yes"]));
    }

    #[test]
    fn clean_telco_drops_blank_charges() {
        let (x, y) = make_xy(&table(), "Churn").unwrap();
        let (x, y) = clean_telco(x, y).unwrap();
        assert_eq!(x.nrows(), 3);
        assert_eq!(y.to_vec(), vec![0, 0, 1]);
        assert_eq!(
            x.column("TotalCharges"),
            Some(&Column::Numeric(vec![29.85, 1889.5, 108.15]))
        );
    }

    #[test]
    fn encoded_columns_follow_get_dummies_layout() {
        let (x, y) = make_xy(&table(), "Churn").unwrap();
        let (x, _) = clean_telco(x, y).unwrap();
        let encoded = one_hot_encode(&x, true);
        assert_eq!(
            encoded.column_names(),
            &strings(&["tenure", "TotalCharges", "Contract_One year"])
        );
        let full = one_hot_encode(&x, false);
        assert_eq!(
            full.column_names(),
            &strings(&[
                "tenure",
                "TotalCharges",
                "Contract_Month-to-month",
                "Contract_One year"
            ])
        );
    }

    #[test]
    fn to_matrix_rejects_categorical() {
        let (x, _) = make_xy(&table(), "Churn").unwrap();
        assert!(matches!(to_matrix(&x), Err(ChurnError::NonNumericColumn(_))));
    }

    #[test]
    fn prepare_features_keeps_ids_aligned() {
        let prepared = prepare_features(&table(), "Churn").unwrap();
        assert_eq!(prepared.ids, strings(&["a", "b", "d"]));
        assert_eq!(prepared.x.nrows(), 3);
        assert!(prepared.x.column("Churn").is_none());
    }

    #[test]
    fn alignment_reports_missing_and_ignored() {
        let (x, y) = make_xy(&table(), "Churn").unwrap();
        let (x, _) = clean_telco(x, y).unwrap();
        let encoded = one_hot_encode(&x, true);

        let (m, alignment) = align_to_feature_columns(&encoded, encoded.column_names()).unwrap();
        assert!(alignment.is_exact());
        assert_eq!(m.ncols(), 3);

        let pinned = strings(&["TotalCharges", "Contract_Two year", "tenure"]);
        let (m, alignment) = align_to_feature_columns(&encoded, &pinned).unwrap();
        assert!(!alignment.is_exact());
        assert_eq!(alignment.missing, strings(&["Contract_Two year"]));
        assert_eq!(alignment.ignored, strings(&["Contract_One year"]));
        assert_eq!(m[[0, 0]], 29.85);
        assert!(m.column(1).iter().all(|&v| v == 0.0));
        assert_eq!(m[[2, 2]], 2.0);
    }

    #[test]
    fn schema_reorder_detected() {
        let expected = strings(&["a", "b"]);
        let err = ensure_feature_columns(&expected, &strings(&["b", "a"])).unwrap_err();
        match err {
            ChurnError::FeatureSchemaMismatch { reordered, .. } => assert!(reordered),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
