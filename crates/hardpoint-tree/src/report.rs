//! Exportable summary of a training run.
//!
//! Field names follow the established `model_stats` JSON layout consumed by
//! the dashboards, so the structs here are pure serde shapes with a single
//! constructor, [`Report::assemble`].

use serde::Serialize;

use crate::confusion::{AverageMetrics, ClassMetrics};
use crate::dataset::Dataset;
use crate::eval::Evaluation;
use crate::label::{N_CLASSES, Outcome};
use crate::sweep::SweepResult;
use crate::tree::DecisionTree;

/// Algorithm name recorded in `model_info.algorithm`.
pub const ALGORITHM_NAME: &str = "Decision Tree Classifier";

/// Complete training report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub model_info: ModelInfo,
    pub confusion_matrix: ConfusionSummary,
    pub classification_report: ClassificationReport,
    pub feature_importance: FeatureImportanceSummary,
    pub depth_analysis: DepthAnalysis,
    pub dataset_distribution: DatasetDistribution,
}

/// Headline model statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub algorithm: String,
    pub accuracy: f64,
    pub training_samples: usize,
    pub testing_samples: usize,
    pub tree_depth: usize,
    pub leaf_nodes: usize,
    pub total_samples: usize,
}

/// Confusion matrix cells with win as the positive class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionSummary {
    /// `[loss][loss]`
    pub true_negatives: usize,
    /// `[loss][win]`
    pub false_positives: usize,
    /// `[win][loss]`
    pub false_negatives: usize,
    /// `[win][win]`
    pub true_positives: usize,
    /// Raw rows in `[loss, win]` order.
    pub matrix: [[usize; N_CLASSES]; N_CLASSES],
}

/// Metrics for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassReport {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Averaged metrics (no support column).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageReport {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub loss: ClassReport,
    pub win: ClassReport,
    pub accuracy: f64,
    pub macro_avg: AverageReport,
    pub weighted_avg: AverageReport,
}

/// One entry of the importance list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportanceEntry {
    pub name: String,
    pub importance: f64,
}

/// Importances sorted descending, plus the leading feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportanceSummary {
    pub features: Vec<FeatureImportanceEntry>,
    pub top_feature: String,
    pub top_importance: f64,
}

/// Accuracy per depth bound and the best one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthAnalysis {
    pub depths: Vec<i64>,
    pub accuracies: Vec<f64>,
    pub best_depth: Option<i64>,
    pub best_accuracy: Option<f64>,
}

/// Class balance on each side of the holdout split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetDistribution {
    pub train_wins: usize,
    pub train_losses: usize,
    pub test_wins: usize,
    pub test_losses: usize,
}

impl From<ClassMetrics> for ClassReport {
    fn from(m: ClassMetrics) -> Self {
        Self {
            precision: m.precision,
            recall: m.recall,
            f1_score: m.f1,
            support: m.support,
        }
    }
}

impl From<AverageMetrics> for AverageReport {
    fn from(m: AverageMetrics) -> Self {
        Self {
            precision: m.precision,
            recall: m.recall,
            f1_score: m.f1,
        }
    }
}

impl Report {
    /// Combine a fitted model, its held-out evaluation, a depth sweep, and the
    /// split class balance into one report.
    #[must_use]
    pub fn assemble(
        model: &DecisionTree,
        evaluation: &Evaluation,
        sweep: &SweepResult,
        train: &Dataset,
        test: &Dataset,
    ) -> Self {
        let rows = *evaluation.confusion_matrix.as_rows();
        let (loss, win) = (Outcome::Loss.index(), Outcome::Win.index());

        let ranked = model.ranked_features();
        let (top_feature, top_importance) = ranked
            .first()
            .map(|f| (f.name.clone(), f.importance))
            .unwrap_or_default();
        let features = ranked
            .into_iter()
            .map(|f| FeatureImportanceEntry {
                name: f.name,
                importance: f.importance,
            })
            .collect();

        let best = sweep.best();
        let [loss_metrics, win_metrics] = evaluation.class_metrics;

        Self {
            model_info: ModelInfo {
                algorithm: ALGORITHM_NAME.to_string(),
                accuracy: evaluation.accuracy,
                training_samples: train.n_samples(),
                testing_samples: test.n_samples(),
                tree_depth: model.depth(),
                leaf_nodes: model.n_leaves(),
                total_samples: train.n_samples() + test.n_samples(),
            },
            confusion_matrix: ConfusionSummary {
                true_negatives: rows[loss][loss],
                false_positives: rows[loss][win],
                false_negatives: rows[win][loss],
                true_positives: rows[win][win],
                matrix: rows,
            },
            classification_report: ClassificationReport {
                loss: loss_metrics.into(),
                win: win_metrics.into(),
                accuracy: evaluation.accuracy,
                macro_avg: evaluation.macro_avg.into(),
                weighted_avg: evaluation.weighted_avg.into(),
            },
            feature_importance: FeatureImportanceSummary {
                features,
                top_feature,
                top_importance,
            },
            depth_analysis: DepthAnalysis {
                depths: sweep.depths(),
                accuracies: sweep.accuracies(),
                best_depth: best.map(|b| b.depth),
                best_accuracy: best.map(|b| b.accuracy),
            },
            dataset_distribution: DatasetDistribution {
                train_wins: train.count(Outcome::Win),
                train_losses: train.count(Outcome::Loss),
                test_wins: test.count(Outcome::Win),
                test_losses: test.count(Outcome::Loss),
            },
        }
    }
}
