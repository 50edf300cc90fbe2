//! Held-out evaluation of a fitted tree.

use tracing::{info, instrument};

use crate::confusion::{AverageMetrics, ClassMetrics, ConfusionMatrix};
use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::label::{N_CLASSES, Outcome};
use crate::tree::DecisionTree;

/// Predictions and metrics for one model on one labeled dataset.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// One prediction per evaluated sample, in sample order.
    pub predictions: Vec<Outcome>,
    /// Confusion matrix in `[loss, win]` order.
    pub confusion_matrix: ConfusionMatrix,
    /// Fraction of correct predictions.
    pub accuracy: f64,
    /// Per-class metrics in `[loss, win]` order.
    pub class_metrics: [ClassMetrics; N_CLASSES],
    /// Unweighted mean of the per-class metrics.
    pub macro_avg: AverageMetrics,
    /// Support-weighted mean of the per-class metrics.
    pub weighted_avg: AverageMetrics,
}

impl Evaluation {
    /// Compute all metrics from parallel predicted and true label sequences.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::LengthMismatch`] | Sequences differ in length |
    /// | [`TreeError::EmptyInput`] | Zero labels provided |
    pub fn from_predictions(
        predictions: Vec<Outcome>,
        true_labels: &[Outcome],
    ) -> Result<Self, TreeError> {
        let confusion_matrix = ConfusionMatrix::from_labels(true_labels, &predictions)?;
        Ok(Self {
            accuracy: confusion_matrix.accuracy(),
            class_metrics: confusion_matrix.class_metrics(),
            macro_avg: confusion_matrix.macro_average(),
            weighted_avg: confusion_matrix.weighted_average(),
            confusion_matrix,
            predictions,
        })
    }
}

/// Predict every sample in `test` and score the predictions.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::DimensionMismatch`] | `test` has a different feature count than the model |
/// | [`TreeError::EmptyInput`] | `test` has zero samples |
#[instrument(skip_all, fields(n_samples = test.n_samples()))]
pub fn evaluate(tree: &DecisionTree, test: &Dataset) -> Result<Evaluation, TreeError> {
    let predictions = tree.predict_batch(test.features())?;
    let evaluation = Evaluation::from_predictions(predictions, test.labels())?;
    info!(accuracy = evaluation.accuracy, "evaluation complete");
    Ok(evaluation)
}

/// Accuracy only, for callers that do not need the full metric set.
///
/// # Errors
///
/// Same as [`evaluate`].
pub fn accuracy(tree: &DecisionTree, test: &Dataset) -> Result<f64, TreeError> {
    let predictions = tree.predict_batch(test.features())?;
    Ok(ConfusionMatrix::from_labels(test.labels(), &predictions)?.accuracy())
}
