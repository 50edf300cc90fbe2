//! Labeled feature matrix shared by training, splitting, and evaluation.

use crate::error::TreeError;
use crate::label::{N_CLASSES, Outcome};

/// An ordered set of labeled feature vectors with a shared feature ordering.
///
/// Construction validates the invariants every consumer relies on: all rows
/// have `feature_names.len()` values, every value is finite, and there is
/// exactly one label per row. An empty dataset is allowed so that training
/// can report [`TreeError::EmptyDataset`] itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<Outcome>,
}

impl Dataset {
    /// Create a validated dataset.
    ///
    /// `features[sample_idx][feature_idx]` — row-major layout.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::ZeroFeatures`] | `feature_names` is empty |
    /// | [`TreeError::LengthMismatch`] | `features.len() != labels.len()` |
    /// | [`TreeError::FeatureCountMismatch`] | a row length differs from `feature_names.len()` |
    /// | [`TreeError::NonFiniteValue`] | a value is NaN or infinite |
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<Outcome>,
    ) -> Result<Self, TreeError> {
        if feature_names.is_empty() {
            return Err(TreeError::ZeroFeatures);
        }
        if features.len() != labels.len() {
            return Err(TreeError::LengthMismatch {
                predicted: features.len(),
                actual: labels.len(),
            });
        }
        let n_features = feature_names.len();
        for (sample_index, row) in features.iter().enumerate() {
            if row.len() != n_features {
                return Err(TreeError::FeatureCountMismatch {
                    expected: n_features,
                    got: row.len(),
                    sample_index,
                });
            }
            if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
                return Err(TreeError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    /// Build the subset made of the rows at `indices`, in the given order.
    pub(crate) fn subset(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the labels, one per row.
    #[must_use]
    pub fn labels(&self) -> &[Outcome] {
        &self.labels
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return `true` if the dataset holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Return raw per-class sample counts in `[loss, win]` order.
    #[must_use]
    pub fn class_counts(&self) -> [usize; N_CLASSES] {
        let mut counts = [0usize; N_CLASSES];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    /// Return the number of samples labeled `outcome`.
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.class_counts()[outcome.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    #[test]
    fn valid_dataset() {
        let ds = Dataset::new(
            names(2),
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
            vec![Outcome::Win, Outcome::Loss, Outcome::Win],
        )
        .unwrap();
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.class_counts(), [1, 2]);
        assert_eq!(ds.count(Outcome::Win), 2);
    }

    #[test]
    fn empty_dataset_is_allowed() {
        let ds = Dataset::new(names(1), vec![], vec![]).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn zero_features_error() {
        let err = Dataset::new(vec![], vec![], vec![]).unwrap_err();
        assert!(matches!(err, TreeError::ZeroFeatures));
    }

    #[test]
    fn label_count_mismatch() {
        let err = Dataset::new(names(1), vec![vec![1.0]], vec![]).unwrap_err();
        assert!(matches!(
            err,
            TreeError::LengthMismatch {
                predicted: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = Dataset::new(
            names(2),
            vec![vec![1.0, 2.0], vec![3.0]],
            vec![Outcome::Win, Outcome::Loss],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TreeError::FeatureCountMismatch {
                expected: 2,
                got: 1,
                sample_index: 1
            }
        ));
    }

    #[test]
    fn nan_rejected() {
        let err = Dataset::new(names(2), vec![vec![1.0, f64::NAN]], vec![Outcome::Win]).unwrap_err();
        assert!(matches!(
            err,
            TreeError::NonFiniteValue {
                sample_index: 0,
                feature_index: 1
            }
        ));
    }

    #[test]
    fn subset_preserves_order() {
        let ds = Dataset::new(
            names(1),
            vec![vec![0.0], vec![1.0], vec![2.0]],
            vec![Outcome::Loss, Outcome::Win, Outcome::Loss],
        )
        .unwrap();
        let sub = ds.subset(&[2, 0]);
        assert_eq!(sub.features(), &[vec![2.0], vec![0.0]]);
        assert_eq!(sub.labels(), &[Outcome::Loss, Outcome::Loss]);
        assert_eq!(sub.feature_names(), ds.feature_names());
    }
}
