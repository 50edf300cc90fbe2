//! Stratified, seeded train/test holdout split.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::label::N_CLASSES;

/// Holdout split configuration.
///
/// Construct via [`HoldoutSplit::new`], then chain `with_seed` if desired.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `test_fraction` | 0.2     |
/// | `seed`          | 42      |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldoutSplit {
    test_fraction: f64,
    seed: u64,
}

/// Disjoint train and test subsets produced by [`HoldoutSplit::split`].
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Samples used to fit the model.
    pub train: Dataset,
    /// Held-out samples used for evaluation.
    pub test: Dataset,
}

impl HoldoutSplit {
    /// Create a holdout config with the given test fraction.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTestFraction`] unless `0.0 < test_fraction < 1.0`.
    pub fn new(test_fraction: f64) -> Result<Self, TreeError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(TreeError::InvalidTestFraction {
                fraction: test_fraction,
            });
        }
        Ok(Self {
            test_fraction,
            seed: 42,
        })
    }

    /// Set the random seed for within-class shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the test fraction.
    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Partition `dataset` into stratified train and test subsets.
    ///
    /// The test side receives `ceil(test_fraction * n)` samples, apportioned
    /// across classes in proportion to their frequency. Both subsets keep the
    /// original row order. The same dataset and seed always produce the same
    /// membership.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | Zero samples |
    /// | [`TreeError::InsufficientSamples`] | Train or test side would be empty |
    #[instrument(skip_all, fields(n_samples = dataset.n_samples(), test_fraction = self.test_fraction))]
    pub fn split(&self, dataset: &Dataset) -> Result<TrainTestSplit, TreeError> {
        if dataset.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        let n_samples = dataset.n_samples();
        // 1e-9 keeps an exact product such as 0.2 * 100 from rounding up to 21.
        let n_test = ((self.test_fraction * n_samples as f64) - 1e-9).ceil() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(TreeError::InsufficientSamples { n_samples, n_test });
        }

        let class_counts = dataset.class_counts();
        let per_class_test = apportion(n_test, &class_counts, n_samples);
        debug!(?class_counts, ?per_class_test, "apportioned test samples");

        // Group indices by class, shuffle within each class.
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut class_indices: Vec<Vec<usize>> = vec![vec![]; N_CLASSES];
        for (i, label) in dataset.labels().iter().enumerate() {
            class_indices[label.index()].push(i);
        }

        let mut in_test = vec![false; n_samples];
        for (class, indices) in class_indices.iter_mut().enumerate() {
            indices.shuffle(&mut rng);
            for &idx in indices.iter().take(per_class_test[class]) {
                in_test[idx] = true;
            }
        }

        let (test_idx, train_idx): (Vec<usize>, Vec<usize>) =
            (0..n_samples).partition(|&i| in_test[i]);

        info!(
            n_train = train_idx.len(),
            n_test = test_idx.len(),
            "holdout split complete"
        );

        Ok(TrainTestSplit {
            train: dataset.subset(&train_idx),
            test: dataset.subset(&test_idx),
        })
    }
}

impl Default for HoldoutSplit {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Distribute `n_test` slots across classes proportionally to `counts`.
///
/// Each class gets the floor of its exact share; leftover slots go to the
/// classes with the largest fractional remainder, ties by class order.
fn apportion(n_test: usize, counts: &[usize; N_CLASSES], n_samples: usize) -> [usize; N_CLASSES] {
    let mut alloc = [0usize; N_CLASSES];
    let mut remainders = [(0.0f64, 0usize); N_CLASSES];
    for class in 0..N_CLASSES {
        let share = n_test as f64 * counts[class] as f64 / n_samples as f64;
        alloc[class] = (share.floor() as usize).min(counts[class]);
        remainders[class] = (share - share.floor(), class);
    }

    let mut leftover = n_test.saturating_sub(alloc.iter().sum());
    // Stable sort keeps class order among equal remainders.
    remainders.sort_by(|a, b| b.0.total_cmp(&a.0));
    while leftover > 0 {
        let before = leftover;
        for &(_, class) in &remainders {
            if leftover == 0 {
                break;
            }
            if alloc[class] < counts[class] {
                alloc[class] += 1;
                leftover -= 1;
            }
        }
        if leftover == before {
            break;
        }
    }
    alloc
}
