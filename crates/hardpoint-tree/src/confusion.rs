//! Confusion matrix and per-class classification metrics.

use std::fmt;

use crate::error::TreeError;
use crate::label::{N_CLASSES, Outcome};

/// A 2×2 confusion matrix over the fixed label order `[loss, win]`.
///
/// Entry `matrix[true_class][predicted_class]` counts how many samples
/// with true label `true_class` were predicted as `predicted_class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    matrix: [[usize; N_CLASSES]; N_CLASSES],
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    /// The class these metrics describe.
    pub class: Outcome,
    /// Precision: TP / (TP + FP). 0.0 if no predictions for this class.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no true samples for this class.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

/// Precision, recall, and F1 averaged across classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageMetrics {
    /// Averaged precision.
    pub precision: f64,
    /// Averaged recall.
    pub recall: f64,
    /// Averaged F1.
    pub f1: f64,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::LengthMismatch`] | Sequences differ in length |
    /// | [`TreeError::EmptyInput`] | Zero labels provided |
    pub fn from_labels(true_labels: &[Outcome], predicted: &[Outcome]) -> Result<Self, TreeError> {
        if true_labels.len() != predicted.len() {
            return Err(TreeError::LengthMismatch {
                predicted: predicted.len(),
                actual: true_labels.len(),
            });
        }
        if true_labels.is_empty() {
            return Err(TreeError::EmptyInput);
        }
        let mut matrix = [[0usize; N_CLASSES]; N_CLASSES];
        for (t, p) in true_labels.iter().zip(predicted) {
            matrix[t.index()][p.index()] += 1;
        }
        Ok(Self { matrix })
    }

    /// Return the count of samples with true label `actual` predicted as `predicted`.
    #[must_use]
    pub fn get(&self, actual: Outcome, predicted: Outcome) -> usize {
        self.matrix[actual.index()][predicted.index()]
    }

    /// Return the total number of samples in the matrix.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..N_CLASSES).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Per-class precision, recall, F1, and support in `[loss, win]` order.
    #[must_use]
    pub fn class_metrics(&self) -> [ClassMetrics; N_CLASSES] {
        Outcome::ALL.map(|class| {
            let c = class.index();
            let tp = self.matrix[c][c];
            let fp: usize = (0..N_CLASSES)
                .filter(|&i| i != c)
                .map(|i| self.matrix[i][c])
                .sum();
            let fn_: usize = (0..N_CLASSES)
                .filter(|&j| j != c)
                .map(|j| self.matrix[c][j])
                .sum();
            let support = tp + fn_;
            let precision = if tp + fp == 0 {
                0.0
            } else {
                tp as f64 / (tp + fp) as f64
            };
            let recall = if support == 0 {
                0.0
            } else {
                tp as f64 / support as f64
            };
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            ClassMetrics {
                class,
                precision,
                recall,
                f1,
                support,
            }
        })
    }

    /// Unweighted mean of per-class metrics.
    #[must_use]
    pub fn macro_average(&self) -> AverageMetrics {
        let metrics = self.class_metrics();
        let n = N_CLASSES as f64;
        AverageMetrics {
            precision: metrics.iter().map(|m| m.precision).sum::<f64>() / n,
            recall: metrics.iter().map(|m| m.recall).sum::<f64>() / n,
            f1: metrics.iter().map(|m| m.f1).sum::<f64>() / n,
        }
    }

    /// Support-weighted mean of per-class metrics.
    #[must_use]
    pub fn weighted_average(&self) -> AverageMetrics {
        let metrics = self.class_metrics();
        let total = self.total() as f64;
        let weighted = |f: fn(&ClassMetrics) -> f64| -> f64 {
            if total == 0.0 {
                return 0.0;
            }
            metrics.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total
        };
        AverageMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
        }
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[[usize; N_CLASSES]; N_CLASSES] {
        &self.matrix
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "")?;
        for class in Outcome::ALL {
            write!(f, " pred_{:<4}", class.as_str())?;
        }
        writeln!(f)?;

        for class in Outcome::ALL {
            write!(f, "true_{:<5}", class.as_str())?;
            for val in &self.matrix[class.index()] {
                write!(f, " {val:>9}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
