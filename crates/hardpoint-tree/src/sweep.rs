//! Depth sweep: independent models trained across a grid of depth bounds.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::eval::accuracy;
use crate::tree::TreeConfig;

/// Depth grid used when none is given.
pub const DEFAULT_DEPTHS: [i64; 6] = [1, 3, 5, 10, 15, 20];

/// Depth sweep configuration.
///
/// Construct via [`DepthSweep::new`]. Every depth trains from scratch with
/// the base [`TreeConfig`]'s class weights; only `max_depth` varies.
#[derive(Debug, Clone)]
pub struct DepthSweep {
    depths: Vec<i64>,
}

/// Test accuracy for one depth bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthAccuracy {
    /// The `max_depth` used for training.
    pub depth: i64,
    /// Accuracy on the test set.
    pub accuracy: f64,
}

/// Ordered results of a depth sweep, one entry per requested depth.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    /// Results in the same order as the requested depths.
    pub results: Vec<DepthAccuracy>,
}

impl SweepResult {
    /// Return the entry with the highest accuracy.
    ///
    /// The first entry (in depth-grid order) wins ties. Returns `None` only
    /// for an empty result.
    #[must_use]
    pub fn best(&self) -> Option<DepthAccuracy> {
        let mut best: Option<DepthAccuracy> = None;
        for &r in &self.results {
            if best.is_none_or(|b| r.accuracy > b.accuracy) {
                best = Some(r);
            }
        }
        best
    }

    /// Return the depths in sweep order.
    #[must_use]
    pub fn depths(&self) -> Vec<i64> {
        self.results.iter().map(|r| r.depth).collect()
    }

    /// Return the accuracies in sweep order.
    #[must_use]
    pub fn accuracies(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.accuracy).collect()
    }
}

impl DepthSweep {
    /// Create a sweep over the given depths (order is preserved).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyDepthGrid`] if `depths` is empty.
    pub fn new(depths: Vec<i64>) -> Result<Self, TreeError> {
        if depths.is_empty() {
            return Err(TreeError::EmptyDepthGrid);
        }
        Ok(Self { depths })
    }

    /// Return the depth grid.
    #[must_use]
    pub fn depths(&self) -> &[i64] {
        &self.depths
    }

    /// Train one tree per depth on `train` and score it on `test`.
    ///
    /// Depths are trained in parallel on the rayon pool; the returned
    /// results keep the grid order regardless of completion order.
    ///
    /// # Errors
    ///
    /// Propagates training and evaluation errors, e.g.
    /// [`TreeError::InvalidDepth`] for a negative depth in the grid.
    #[instrument(skip_all, fields(n_depths = self.depths.len(), n_train = train.n_samples()))]
    pub fn run(
        &self,
        base: &TreeConfig,
        train: &Dataset,
        test: &Dataset,
    ) -> Result<SweepResult, TreeError> {
        let results = self
            .depths
            .par_iter()
            .map(|&depth| -> Result<DepthAccuracy, TreeError> {
                let tree = base.clone().with_max_depth(depth).fit(train)?;
                let acc = accuracy(&tree, test)?;
                debug!(depth, accuracy = acc, actual_depth = tree.depth(), "depth evaluated");
                Ok(DepthAccuracy {
                    depth,
                    accuracy: acc,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let result = SweepResult { results };
        if let Some(best) = result.best() {
            info!(
                best_depth = best.depth,
                best_accuracy = best.accuracy,
                "depth sweep complete"
            );
        }
        Ok(result)
    }
}

impl Default for DepthSweep {
    fn default() -> Self {
        Self {
            depths: DEFAULT_DEPTHS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Outcome;

    fn blocks(n: usize) -> Dataset {
        let features: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64]).collect();
        let labels = (0..n)
            .map(|i| if (i / 3) % 2 == 0 { Outcome::Loss } else { Outcome::Win })
            .collect();
        Dataset::new(vec!["x".into()], features, labels).unwrap()
    }

    #[test]
    fn preserves_depth_order() {
        let ds = blocks(24);
        let sweep = DepthSweep::new(vec![5, 1, 3, 0]).unwrap();
        let result = sweep.run(&TreeConfig::new(1), &ds, &ds).unwrap();
        assert_eq!(result.depths(), vec![5, 1, 3, 0]);
        assert_eq!(result.accuracies().len(), 4);
    }

    #[test]
    fn deeper_trees_fit_training_data_better() {
        let ds = blocks(24);
        let sweep = DepthSweep::new(vec![0, 10]).unwrap();
        let result = sweep.run(&TreeConfig::new(1), &ds, &ds).unwrap();
        assert!(result.results[1].accuracy >= result.results[0].accuracy);
        assert!((result.results[1].accuracy - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn matches_independent_training() {
        let ds = blocks(30);
        let sweep = DepthSweep::new(vec![2, 4]).unwrap();
        let result = sweep.run(&TreeConfig::new(1), &ds, &ds).unwrap();
        for r in &result.results {
            let tree = TreeConfig::new(r.depth).fit(&ds).unwrap();
            let acc = accuracy(&tree, &ds).unwrap();
            assert!((acc - r.accuracy).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn best_takes_first_on_tie() {
        let result = SweepResult {
            results: vec![
                DepthAccuracy { depth: 1, accuracy: 0.6 },
                DepthAccuracy { depth: 3, accuracy: 0.8 },
                DepthAccuracy { depth: 5, accuracy: 0.8 },
                DepthAccuracy { depth: 10, accuracy: 0.7 },
            ],
        };
        let best = result.best().unwrap();
        assert_eq!(best.depth, 3);
        assert!(result.results.iter().all(|r| best.accuracy >= r.accuracy));
    }

    #[test]
    fn empty_grid_error() {
        assert!(matches!(DepthSweep::new(vec![]), Err(TreeError::EmptyDepthGrid)));
    }

    #[test]
    fn negative_depth_propagates() {
        let ds = blocks(12);
        let sweep = DepthSweep::new(vec![2, -3]).unwrap();
        let err = sweep.run(&TreeConfig::new(1), &ds, &ds).unwrap_err();
        assert!(matches!(err, TreeError::InvalidDepth { max_depth: -3 }));
    }

    #[test]
    fn default_grid() {
        assert_eq!(DepthSweep::default().depths(), &[1, 3, 5, 10, 15, 20]);
    }
}
