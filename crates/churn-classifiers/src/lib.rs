//! churn-classifiers: customer churn prediction from tabular CSV exports.
//!
//! This crate provides the table model and preprocessing used to turn a raw
//! customer export into a numeric design matrix, a majority-class baseline and
//! an L2-penalised logistic regression, stratified splitting, threshold tuning
//! against recall/precision targets, and reporting and artifact helpers used
//! by the `churn` command line tool.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod split;
pub mod stats;

pub use error::{ChurnError, Result};
