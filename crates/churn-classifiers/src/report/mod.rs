//! Reporting and plotting helpers for evaluated models.
//!
//! Text reports mirror the usual per-class precision/recall/F1 layout and
//! coefficient rankings; plots are small helpers converting the threshold
//! sweep into a `plotly::Plot`.
pub mod classification;
pub mod coefficients;
pub mod plots;

pub use classification::{report, ClassMetrics, ClassificationReport};
pub use coefficients::{format_coefficients, top_coefficients, CoefficientRow};
pub use plots::{plot_precision_recall, write_precision_recall_plot};
