//! Telco churn CSV reader and prediction writer.
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::data_handling::RawTable;
use crate::error::{ChurnError, Result};

/// Load a churn CSV exactly as stored. No cleaning happens here.
pub fn load_telco_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ChurnError::FileNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    log::debug!(
        "Loaded {} rows x {} columns from {}",
        rows.len(),
        headers.len(),
        path.display()
    );

    RawTable::new(headers, rows)
}

/// One scored customer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionRow {
    #[serde(rename = "customerID")]
    pub customer_id: String,
    pub probability: f64,
    pub prediction: u8,
}

/// Write scored rows as CSV with a header line.
pub fn write_predictions<W: Write>(writer: W, rows: &[PredictionRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
