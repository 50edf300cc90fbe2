//! End-to-end training run: split, fit, evaluate, sweep, report.

use tracing::{info, instrument};

use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::eval::{Evaluation, evaluate};
use crate::holdout::{HoldoutSplit, TrainTestSplit};
use crate::label::ClassWeights;
use crate::report::Report;
use crate::sweep::{DepthSweep, SweepResult};
use crate::tree::{DecisionTree, TreeConfig};

/// Depth of the primary model when none is given.
pub const DEFAULT_MAX_DEPTH: i64 = 5;

/// Configuration for a full training run.
///
/// Construct via [`PipelineConfig::new`] (or `default()`), then chain `with_*`
/// methods.
///
/// # Defaults
///
/// | Parameter       | Default                    |
/// |-----------------|----------------------------|
/// | `max_depth`     | 5                          |
/// | `class_weights` | loss 1.0, win 2.0          |
/// | `test_fraction` | 0.2                        |
/// | `seed`          | 42                         |
/// | `depths`        | `[1, 3, 5, 10, 15, 20]`    |
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    tree: TreeConfig,
    holdout: HoldoutSplit,
    sweep: DepthSweep,
}

/// Everything a training run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The primary model, trained at the configured depth.
    pub model: DecisionTree,
    /// Held-out evaluation of the primary model.
    pub evaluation: Evaluation,
    /// Accuracy per depth bound.
    pub sweep: SweepResult,
    /// Exportable summary.
    pub report: Report,
    /// The train and test subsets used.
    pub split: TrainTestSplit,
}

impl PipelineConfig {
    /// Create a config with every parameter at its default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: TreeConfig::new(DEFAULT_MAX_DEPTH),
            holdout: HoldoutSplit::default(),
            sweep: DepthSweep::default(),
        }
    }

    // --- Setters ---

    /// Set the depth of the primary model.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: i64) -> Self {
        self.tree = self.tree.with_max_depth(max_depth);
        self
    }

    /// Set the class weights shared by the primary model and the sweep.
    #[must_use]
    pub fn with_class_weights(mut self, class_weights: ClassWeights) -> Self {
        self.tree = self.tree.with_class_weights(class_weights);
        self
    }

    /// Set the holdout split.
    #[must_use]
    pub fn with_holdout(mut self, holdout: HoldoutSplit) -> Self {
        self.holdout = holdout;
        self
    }

    /// Set the depth sweep grid.
    #[must_use]
    pub fn with_sweep(mut self, sweep: DepthSweep) -> Self {
        self.sweep = sweep;
        self
    }

    // --- Getters ---

    /// Return the primary tree config.
    #[must_use]
    pub fn tree(&self) -> &TreeConfig {
        &self.tree
    }

    /// Return the holdout split config.
    #[must_use]
    pub fn holdout(&self) -> &HoldoutSplit {
        &self.holdout
    }

    /// Return the depth sweep config.
    #[must_use]
    pub fn sweep(&self) -> &DepthSweep {
        &self.sweep
    }

    /// Run the full pipeline on a labeled dataset.
    ///
    /// # Errors
    ///
    /// Propagates any error from splitting, fitting, evaluating, or sweeping.
    /// Notably [`TreeError::EmptyDataset`], [`TreeError::InsufficientSamples`]
    /// and [`TreeError::InvalidDepth`].
    #[instrument(skip_all, fields(n_samples = dataset.n_samples(), max_depth = self.tree.max_depth()))]
    pub fn run(&self, dataset: &Dataset) -> Result<PipelineOutcome, TreeError> {
        let split = self.holdout.split(dataset)?;
        let model = self.tree.fit(&split.train)?;
        let evaluation = evaluate(&model, &split.test)?;
        let sweep = self.sweep.run(&self.tree, &split.train, &split.test)?;
        let report = Report::assemble(&model, &evaluation, &sweep, &split.train, &split.test);

        info!(
            accuracy = evaluation.accuracy,
            depth = model.depth(),
            leaves = model.n_leaves(),
            "pipeline complete"
        );

        Ok(PipelineOutcome {
            model,
            evaluation,
            sweep,
            report,
            split,
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
