//! Seeded, class-stratified train/test partitioning.
use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{ChurnError, Result};

/// Row-aligned train and test partitions.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<u8>,
    pub y_test: Array1<u8>,
}

/// Partition rows so that each class keeps its share in both sets.
///
/// Every class contributes `round(count * test_size)` rows to the test set.
/// The same `random_state` always produces the same partition.
pub fn stratified_split(
    x: &Array2<f64>,
    y: &Array1<u8>,
    test_size: f64,
    random_state: u64,
) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ChurnError::InvalidTestSize(test_size));
    }
    if x.nrows() != y.len() {
        return Err(ChurnError::LengthMismatch {
            what: "target vector",
            expected: x.nrows(),
            actual: y.len(),
        });
    }

    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }

    let mut rng = StdRng::seed_from_u64(random_state);
    let mut train_idx = Vec::with_capacity(y.len());
    let mut test_idx = Vec::new();

    for (&class, indices) in by_class.iter_mut() {
        let n_test = (indices.len() as f64 * test_size).round() as usize;
        if n_test == 0 {
            return Err(ChurnError::EmptyClass {
                class,
                partition: "test",
            });
        }
        if n_test >= indices.len() {
            return Err(ChurnError::EmptyClass {
                class,
                partition: "train",
            });
        }
        indices.shuffle(&mut rng);
        test_idx.extend_from_slice(&indices[..n_test]);
        train_idx.extend_from_slice(&indices[n_test..]);
    }

    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    log::debug!(
        "Stratified split: {} train rows, {} test rows",
        train_idx.len(),
        test_idx.len()
    );

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_idx),
        x_test: x.select(Axis(0), &test_idx),
        y_train: y.select(Axis(0), &train_idx),
        y_test: y.select(Axis(0), &test_idx),
    })
}
