//! Prediction methods for a fitted decision tree.

use crate::error::TreeError;
use crate::label::Outcome;
use crate::node::Node;
use crate::tree::DecisionTree;

/// A single prediction with the leaf's weighted support for it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Prediction {
    /// Predicted outcome.
    pub outcome: Outcome,
    /// Weighted proportion of the predicted class in the leaf, in [0, 1].
    pub confidence: f64,
}

impl DecisionTree {
    /// Predict the outcome for a single feature vector.
    ///
    /// Traverses from the root: at each split, goes left when
    /// `sample[feature] <= threshold`, right otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DimensionMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<Outcome, TreeError> {
        Ok(self.predict_with_confidence(sample)?.outcome)
    }

    /// Predict the outcome and report the leaf's weighted class share.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DimensionMismatch`] when `sample.len() != n_features`.
    pub fn predict_with_confidence(&self, sample: &[f64]) -> Result<Prediction, TreeError> {
        self.check_dimension(sample)?;
        match self.root.leaf_for(sample) {
            Node::Leaf {
                prediction,
                distribution,
                ..
            } => Ok(Prediction {
                outcome: *prediction,
                confidence: distribution[prediction.index()],
            }),
            Node::Split { .. } => unreachable!("leaf_for always ends at a leaf"),
        }
    }

    /// Predict outcomes for a batch of feature vectors.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DimensionMismatch`] for the first sample whose
    /// length differs from `n_features`.
    pub fn predict_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<Outcome>, TreeError> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    fn check_dimension(&self, sample: &[f64]) -> Result<(), TreeError> {
        if sample.len() != self.n_features() {
            return Err(TreeError::DimensionMismatch {
                expected: self.n_features(),
                got: sample.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::Dataset;
    use crate::error::TreeError;
    use crate::label::Outcome;
    use crate::tree::TreeConfig;

    fn train() -> crate::tree::DecisionTree {
        let ds = Dataset::new(
            vec!["x".into(), "y".into()],
            vec![
                vec![1.0, 0.0],
                vec![2.0, 0.0],
                vec![3.0, 0.0],
                vec![10.0, 0.0],
                vec![11.0, 0.0],
            ],
            vec![Outcome::Loss, Outcome::Loss, Outcome::Loss, Outcome::Win, Outcome::Win],
        )
        .unwrap();
        TreeConfig::new(3).fit(&ds).unwrap()
    }

    #[test]
    fn predicts_each_side_of_threshold() {
        let tree = train();
        assert_eq!(tree.predict(&[2.0, 0.0]).unwrap(), Outcome::Loss);
        assert_eq!(tree.predict(&[11.0, 0.0]).unwrap(), Outcome::Win);
    }

    #[test]
    fn threshold_value_goes_left() {
        let tree = train();
        // Midpoint between 3 and 10.
        assert_eq!(tree.predict(&[6.5, 0.0]).unwrap(), Outcome::Loss);
        assert_eq!(tree.predict(&[6.5001, 0.0]).unwrap(), Outcome::Win);
    }

    #[test]
    fn pure_leaf_confidence_is_one() {
        let p = train().predict_with_confidence(&[11.0, 0.0]).unwrap();
        assert_eq!(p.outcome, Outcome::Win);
        assert!((p.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dimension_mismatch() {
        let err = train().predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            TreeError::DimensionMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn batch_matches_single() {
        let tree = train();
        let samples = vec![vec![1.0, 0.0], vec![12.0, 0.0]];
        assert_eq!(
            tree.predict_batch(&samples).unwrap(),
            vec![Outcome::Loss, Outcome::Win]
        );
    }
}
