//! Tabular containers for customer records.
//!
//! `RawTable` keeps the CSV exactly as read. `FeatureFrame` holds named,
//! typed columns (numeric or categorical) that stay row-aligned while the
//! preprocessing steps filter and encode them.
use crate::error::{ChurnError, Result};

/// Cell values treated as missing when inferring column types; the default
/// NA set of pandas `read_csv`.
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub(crate) fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

/// Lenient float parse; anything unparseable or missing becomes `None`.
pub(crate) fn parse_numeric(cell: &str) -> Option<f64> {
    if is_na(cell) {
        return None;
    }
    cell.trim().parse::<f64>().ok()
}

/// CSV contents with no cleaning applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|row| row.len() != headers.len()) {
            return Err(ChurnError::LengthMismatch {
                what: "row width",
                expected: headers.len(),
                actual: bad.len(),
            });
        }
        Ok(Self { headers, rows })
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Raw cells of one column, cloned in row order.
    pub fn column_values(&self, idx: usize) -> Vec<String> {
        self.rows.iter().map(|row| row[idx].clone()).collect()
    }

    /// Build a typed frame from every column except `exclude`.
    pub fn to_frame(&self, exclude: &[&str]) -> FeatureFrame {
        let mut frame = FeatureFrame::with_rows(self.nrows());
        for (idx, name) in self.headers.iter().enumerate() {
            if exclude.contains(&name.as_str()) {
                continue;
            }
            frame.names.push(name.clone());
            frame.columns.push(Column::infer(self.column_values(idx)));
        }
        frame
    }
}

/// A single typed column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Missing entries are NaN.
    Numeric(Vec<f64>),
    /// Missing entries are `None`.
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// A column is numeric when every non-missing cell parses as a float and
    /// at least one cell does; otherwise the raw strings are kept.
    pub fn infer(values: Vec<String>) -> Column {
        let mut parsed = Vec::with_capacity(values.len());
        let mut any_value = false;
        for cell in &values {
            if is_na(cell) {
                parsed.push(f64::NAN);
                continue;
            }
            match cell.trim().parse::<f64>() {
                Ok(v) => {
                    any_value = true;
                    parsed.push(v);
                }
                Err(_) => return Column::categorical(values),
            }
        }
        if any_value {
            Column::Numeric(parsed)
        } else {
            Column::categorical(values)
        }
    }

    fn categorical(values: Vec<String>) -> Column {
        Column::Categorical(
            values
                .into_iter()
                .map(|v| if is_na(&v) { None } else { Some(v) })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    pub fn select(&self, indices: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// Ordered, named, row-aligned columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    names: Vec<String>,
    columns: Vec<Column>,
    nrows: usize,
}

impl FeatureFrame {
    pub fn with_rows(nrows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            nrows,
        }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> impl Iterator<Item = (&String, &Column)> {
        self.names.iter().zip(self.columns.iter())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub(crate) fn push_aligned(&mut self, name: String, column: Column) {
        debug_assert_eq!(column.len(), self.nrows);
        self.names.push(name);
        self.columns.push(column);
    }

    /// Replace a column in place, keeping its position.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<()> {
        let Some(idx) = self.position(name) else {
            return Err(ChurnError::MissingColumn {
                target: name.to_string(),
                available: self.names.clone(),
            });
        };
        if column.len() != self.nrows {
            return Err(ChurnError::LengthMismatch {
                what: "column length",
                expected: self.nrows,
                actual: column.len(),
            });
        }
        self.columns[idx] = column;
        Ok(())
    }

    /// Keep only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> FeatureFrame {
        FeatureFrame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(indices)).collect(),
            nrows: indices.len(),
        }
    }

    /// Keep the rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Result<FeatureFrame> {
        if mask.len() != self.nrows {
            return Err(ChurnError::LengthMismatch {
                what: "row mask",
                expected: self.nrows,
                actual: mask.len(),
            });
        }
        Ok(self.select_rows(&mask_indices(mask)))
    }
}

pub(crate) fn mask_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &keep)| if keep { Some(i) } else { None })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn infers_numeric_with_missing_cells() {
        let col = Column::infer(strings(&["1.5", "", "3"]));
        match col {
            Column::Numeric(v) => {
                assert_eq!(v[0], 1.5);
                assert!(v[1].is_nan());
                assert_eq!(v[2], 3.0);
            }
            other => panic!("expected numeric column, got {:?}", other),
        }
    }

    #[test]
    fn blank_space_keeps_column_categorical() {
        let col = Column::infer(strings(&["29.85", " ", "108.15"]));
        assert!(!col.is_numeric());
    }

    #[test]
    fn read_csv_na_markers_are_missing() {
        let col = Column::infer(strings(&["#N/A", "None", "2", "<NA>", "n/a", "-NaN"]));
        match col {
            Column::Numeric(v) => {
                assert_eq!(v.iter().filter(|x| x.is_nan()).count(), 5);
                assert_eq!(v[2], 2.0);
            }
            other => panic!("expected numeric column, got {:?}", other),
        }
        assert_eq!(
            Column::infer(strings(&["Yes", "None"])),
            Column::Categorical(vec![Some("Yes".to_string()), None])
        );
    }

    #[test]
    fn all_missing_is_categorical() {
        let col = Column::infer(strings(&["", "NA"]));
        assert_eq!(col, Column::Categorical(vec![None, None]));
    }

    #[test]
    fn frame_filter_keeps_alignment() {
        let table = RawTable::new(
            strings(&["id", "a", "b"]),
            vec![
                strings(&["x", "1", "p"]),
                strings(&["y", "2", "q"]),
                strings(&["z", "3", "r"]),
            ],
        )
        .unwrap();
        let frame = table.to_frame(&["id"]);
        assert_eq!(frame.column_names(), &["a".to_string(), "b".to_string()]);

        let filtered = frame.filter(&[true, false, true]).unwrap();
        assert_eq!(filtered.nrows(), 2);
        assert_eq!(filtered.column("a"), Some(&Column::Numeric(vec![1.0, 3.0])));
        assert_eq!(
            filtered.column("b"),
            Some(&Column::Categorical(vec![
                Some("p".to_string()),
                Some("r".to_string())
            ]))
        );
    }

    #[test]
    fn ragged_rows_rejected() {
        let result = RawTable::new(strings(&["a", "b"]), vec![strings(&["1"])]);
        assert!(matches!(result, Err(ChurnError::LengthMismatch { .. })));
    }
}
