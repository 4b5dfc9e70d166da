use std::fmt;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::config::ThresholdStrategy;
use crate::error::{ChurnError, Result};

/// Substituted for `precision + recall` when both are zero.
const F1_EPSILON: f64 = 1e-12;

/// Precision and recall when predicting positive for `proba >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecallRow {
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
}

impl PrecisionRecallRow {
    pub fn f1(&self) -> f64 {
        safe_f1(self.precision, self.recall)
    }
}

/// `2PR / (P + R)` with an epsilon denominator when `P + R == 0`.
pub fn safe_f1(precision: f64, recall: f64) -> f64 {
    let denom = precision + recall;
    let denom = if denom == 0.0 { F1_EPSILON } else { denom };
    2.0 * precision * recall / denom
}

/// Sweep every distinct probability as a threshold.
///
/// Scores are walked in descending order accumulating true and false
/// positives; one row is emitted at the last position of each run of equal
/// scores. Rows are returned by increasing threshold, so recall is
/// non-increasing down the table. The "predict nothing" end point is not
/// included.
///
/// # Arguments
///
/// * `y_true` - 0/1 labels.
/// * `y_proba` - Positive-class probabilities, same length as `y_true`.
pub fn precision_recall_by_threshold(
    y_true: &Array1<u8>,
    y_proba: &Array1<f64>,
) -> Result<Vec<PrecisionRecallRow>> {
    if y_true.len() != y_proba.len() {
        return Err(ChurnError::LengthMismatch {
            what: "probability vector",
            expected: y_true.len(),
            actual: y_proba.len(),
        });
    }
    let total_positives = y_true.iter().filter(|&&v| v == 1).count();
    if total_positives == 0 {
        return Err(ChurnError::NoPositiveSamples);
    }

    let mut order: Vec<usize> = (0..y_proba.len()).collect();
    order.sort_by(|&a, &b| y_proba[b].total_cmp(&y_proba[a]));

    let mut rows = Vec::new();
    let mut tps = 0usize;
    let mut fps = 0usize;
    for (pos, &idx) in order.iter().enumerate() {
        if y_true[idx] == 1 {
            tps += 1;
        } else {
            fps += 1;
        }
        let score = y_proba[idx];
        let last_of_run = order
            .get(pos + 1)
            .map_or(true, |&next| y_proba[next] != score);
        if last_of_run {
            rows.push(PrecisionRecallRow {
                threshold: score,
                precision: tps as f64 / (tps + fps) as f64,
                recall: tps as f64 / total_positives as f64,
            });
        }
    }

    rows.reverse();
    Ok(rows)
}

/// Operating threshold together with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "threshold", rename_all = "snake_case")]
pub enum ThresholdChoice {
    /// At least one row met both constraints; picked by the strategy.
    Satisfied(f64),
    /// No row met both constraints; the globally best-F1 row was used.
    FallbackMaxF1(f64),
}

impl ThresholdChoice {
    pub fn threshold(&self) -> f64 {
        match *self {
            ThresholdChoice::Satisfied(t) | ThresholdChoice::FallbackMaxF1(t) => t,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ThresholdChoice::FallbackMaxF1(_))
    }
}

impl fmt::Display for ThresholdChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdChoice::Satisfied(t) => write!(f, "{:.4} (constraints satisfied)", t),
            ThresholdChoice::FallbackMaxF1(t) => {
                write!(f, "{:.4} (no threshold met constraints; max-F1 fallback)", t)
            }
        }
    }
}

/// Pick a threshold with `recall >= min_recall` and
/// `precision >= min_precision`.
///
/// `First` returns the first qualifying row in table order, `MaxF1` the
/// qualifying row with the highest F1 (earliest row on ties). When nothing
/// qualifies the highest-F1 row of the whole table is returned as
/// `FallbackMaxF1`.
pub fn choose_threshold_for_recall_and_precision(
    table: &[PrecisionRecallRow],
    min_recall: f64,
    min_precision: f64,
    strategy: ThresholdStrategy,
) -> Result<ThresholdChoice> {
    if table.is_empty() {
        return Err(ChurnError::EmptyTable);
    }

    let valid: Vec<&PrecisionRecallRow> = table
        .iter()
        .filter(|row| row.recall >= min_recall && row.precision >= min_precision)
        .collect();

    if valid.is_empty() {
        let best = first_max_f1(table.iter()).ok_or(ChurnError::EmptyTable)?;
        log::warn!(
            "No threshold reaches recall >= {} and precision >= {}; falling back to max F1 ({:.4})",
            min_recall,
            min_precision,
            best.f1()
        );
        return Ok(ThresholdChoice::FallbackMaxF1(best.threshold));
    }

    let chosen = match strategy {
        ThresholdStrategy::First => valid[0],
        ThresholdStrategy::MaxF1 => {
            first_max_f1(valid.iter().copied()).ok_or(ChurnError::EmptyTable)?
        }
    };
    Ok(ThresholdChoice::Satisfied(chosen.threshold))
}

fn first_max_f1<'a, I>(rows: I) -> Option<&'a PrecisionRecallRow>
where
    I: Iterator<Item = &'a PrecisionRecallRow>,
{
    let mut best: Option<(&PrecisionRecallRow, f64)> = None;
    for row in rows {
        let f1 = row.f1();
        match best {
            Some((_, best_f1)) if f1 <= best_f1 => {}
            _ => best = Some((row, f1)),
        }
    }
    best.map(|(row, _)| row)
}

/// 1 where `proba >= threshold`, else 0.
pub fn apply_threshold(y_proba: &Array1<f64>, threshold: f64) -> Array1<u8> {
    y_proba.mapv(|p| u8::from(p >= threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_rows() -> Vec<PrecisionRecallRow> {
        vec![
            PrecisionRecallRow {
                threshold: 0.1,
                precision: 0.5,
                recall: 0.9,
            },
            PrecisionRecallRow {
                threshold: 0.3,
                precision: 0.6,
                recall: 0.75,
            },
        ]
    }

    #[test]
    fn first_strategy_takes_first_qualifying_row() {
        let choice =
            choose_threshold_for_recall_and_precision(&two_rows(), 0.7, 0.5, ThresholdStrategy::First)
                .unwrap();
        assert_eq!(choice, ThresholdChoice::Satisfied(0.1));
    }

    #[test]
    fn max_f1_strategy_takes_best_qualifying_row() {
        let choice =
            choose_threshold_for_recall_and_precision(&two_rows(), 0.7, 0.5, ThresholdStrategy::MaxF1)
                .unwrap();
        assert_eq!(choice, ThresholdChoice::Satisfied(0.3));
    }

    #[test]
    fn unattainable_constraints_fall_back_to_global_max_f1() {
        let choice = choose_threshold_for_recall_and_precision(
            &two_rows(),
            0.99,
            0.5,
            ThresholdStrategy::First,
        )
        .unwrap();
        assert_eq!(choice, ThresholdChoice::FallbackMaxF1(0.3));
        assert!(choice.is_fallback());
    }

    #[test]
    fn max_f1_ties_keep_earliest_row() {
        let rows = vec![
            PrecisionRecallRow { threshold: 0.2, precision: 0.5, recall: 0.5 },
            PrecisionRecallRow { threshold: 0.4, precision: 0.5, recall: 0.5 },
        ];
        let choice =
            choose_threshold_for_recall_and_precision(&rows, 0.0, 0.0, ThresholdStrategy::MaxF1)
                .unwrap();
        assert_eq!(choice.threshold(), 0.2);
    }

    #[test]
    fn zero_precision_and_recall_do_not_divide_by_zero() {
        assert_eq!(safe_f1(0.0, 0.0), 0.0);
        let rows = vec![PrecisionRecallRow { threshold: 0.9, precision: 0.0, recall: 0.0 }];
        let choice =
            choose_threshold_for_recall_and_precision(&rows, 0.5, 0.5, ThresholdStrategy::First)
                .unwrap();
        assert_eq!(choice, ThresholdChoice::FallbackMaxF1(0.9));
    }

    #[test]
    fn empty_table_errors() {
        assert!(matches!(
            choose_threshold_for_recall_and_precision(&[], 0.5, 0.5, ThresholdStrategy::First),
            Err(ChurnError::EmptyTable)
        ));
    }

    #[test]
    fn sweep_matches_hand_counts() {
        let y = array![0u8, 0, 1, 1];
        let p = array![0.1, 0.4, 0.35, 0.8];
        let table = precision_recall_by_threshold(&y, &p).unwrap();
        let thresholds: Vec<f64> = table.iter().map(|r| r.threshold).collect();
        assert_eq!(thresholds, vec![0.1, 0.35, 0.4, 0.8]);

        assert_eq!(table[0].precision, 0.5);
        assert_eq!(table[0].recall, 1.0);
        assert!((table[1].precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(table[1].recall, 1.0);
        assert_eq!(table[2].precision, 0.5);
        assert_eq!(table[2].recall, 0.5);
        assert_eq!(table[3].precision, 1.0);
        assert_eq!(table[3].recall, 0.5);
    }

    #[test]
    fn tied_scores_share_one_row() {
        let y = array![1u8, 0, 1];
        let p = array![0.5, 0.5, 0.9];
        let table = precision_recall_by_threshold(&y, &p).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].threshold, 0.5);
        assert!((table[0].precision - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn recall_is_non_increasing_with_threshold() {
        let y = array![1u8, 0, 1, 0, 1, 1, 0, 0, 1, 0];
        let p = array![0.9, 0.8, 0.7, 0.6, 0.55, 0.5, 0.4, 0.3, 0.2, 0.1];
        let table = precision_recall_by_threshold(&y, &p).unwrap();
        for pair in table.windows(2) {
            assert!(pair[0].threshold < pair[1].threshold);
            assert!(pair[0].recall >= pair[1].recall);
        }
    }

    #[test]
    fn no_positive_labels_errors() {
        let y = array![0u8, 0];
        let p = array![0.2, 0.7];
        assert!(matches!(
            precision_recall_by_threshold(&y, &p),
            Err(ChurnError::NoPositiveSamples)
        ));
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let p = array![0.2, 0.5, 0.49999, 0.9];
        assert_eq!(apply_threshold(&p, 0.5).to_vec(), vec![0, 1, 0, 1]);
    }
}
