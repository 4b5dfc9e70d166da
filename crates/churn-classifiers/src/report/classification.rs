use std::collections::BTreeSet;
use std::fmt;

use ndarray::Array1;

use crate::error::{ChurnError, Result};

const DIGITS: usize = 4;
const HEADERS: [&str; 4] = ["precision", "recall", "f1-score", "support"];
const LONGEST_HEADING: &str = "weighted avg";

/// Metrics for one class or one average line.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class and aggregate metrics for a set of hard predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn class(&self, label: u8) -> Option<&ClassMetrics> {
        let label = label.to_string();
        self.classes.iter().find(|c| c.label == label)
    }

    pub fn total_support(&self) -> usize {
        self.classes.iter().map(|c| c.support).sum()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Compute precision, recall, F1 and support for every label found in
/// either vector. Undefined ratios (zero denominators) are reported as 0.
pub fn report(y_true: &Array1<u8>, y_pred: &Array1<u8>) -> Result<ClassificationReport> {
    if y_true.len() != y_pred.len() {
        return Err(ChurnError::LengthMismatch {
            what: "prediction vector",
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }

    let labels: BTreeSet<u8> = y_true.iter().chain(y_pred.iter()).copied().collect();
    let pairs: Vec<(u8, u8)> = y_true.iter().copied().zip(y_pred.iter().copied()).collect();

    let classes: Vec<ClassMetrics> = labels
        .iter()
        .map(|&label| {
            let tp = pairs.iter().filter(|&&(t, p)| t == label && p == label).count();
            let predicted = pairs.iter().filter(|&&(_, p)| p == label).count();
            let support = pairs.iter().filter(|&&(t, _)| t == label).count();
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            ClassMetrics {
                label: label.to_string(),
                precision,
                recall,
                f1: f1(precision, recall),
                support,
            }
        })
        .collect();

    let total = y_true.len();
    let correct = pairs.iter().filter(|&&(t, p)| t == p).count();
    let n_classes = classes.len().max(1) as f64;

    let mean = |metric: fn(&ClassMetrics) -> f64| classes.iter().map(metric).sum::<f64>() / n_classes;
    let weighted = |metric: fn(&ClassMetrics) -> f64| {
        if total == 0 {
            0.0
        } else {
            classes
                .iter()
                .map(|c| metric(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        }
    };

    let macro_avg = ClassMetrics {
        label: "macro avg".to_string(),
        precision: mean(|c| c.precision),
        recall: mean(|c| c.recall),
        f1: mean(|c| c.f1),
        support: total,
    };
    let weighted_avg = ClassMetrics {
        label: LONGEST_HEADING.to_string(),
        precision: weighted(|c| c.precision),
        recall: weighted(|c| c.recall),
        f1: weighted(|c| c.f1),
        support: total,
    };

    Ok(ClassificationReport {
        accuracy: ratio(correct, total),
        classes,
        macro_avg,
        weighted_avg,
    })
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .chain([LONGEST_HEADING.len(), DIGITS])
            .max()
            .unwrap_or(DIGITS);

        write!(f, "{:>width$} ", "", width = width)?;
        for header in HEADERS {
            write!(f, " {:>9}", header)?;
        }
        writeln!(f)?;
        writeln!(f)?;

        for class in &self.classes {
            write_row(f, class, width)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.digits$} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total_support(),
            width = width,
            digits = DIGITS
        )?;
        write_row(f, &self.macro_avg, width)?;
        write_row(f, &self.weighted_avg, width)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &ClassMetrics, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{:>width$}  {:>9.digits$} {:>9.digits$} {:>9.digits$} {:>9}",
        row.label,
        row.precision,
        row.recall,
        row.f1,
        row.support,
        width = width,
        digits = DIGITS
    )
}
