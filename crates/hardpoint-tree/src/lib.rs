//! Win/loss classification for ranked Hardpoint matches.
//!
//! Provides a weighted-Gini CART decision tree, a stratified holdout split,
//! held-out evaluation metrics, a parallel depth sweep, report assembly, and
//! model serialization.

mod confusion;
mod dataset;
mod error;
mod eval;
mod holdout;
mod importance;
mod label;
mod node;
mod pipeline;
mod predict;
mod report;
mod serialize;
mod split;
mod sweep;
mod tree;

pub use confusion::{AverageMetrics, ClassMetrics, ConfusionMatrix};
pub use dataset::Dataset;
pub use error::TreeError;
pub use eval::{Evaluation, accuracy, evaluate};
pub use holdout::{HoldoutSplit, TrainTestSplit};
pub use importance::RankedFeature;
pub use label::{ClassWeights, N_CLASSES, Outcome, ParseOutcomeError};
pub use node::{FeatureIndex, Impurity, Node};
pub use pipeline::{DEFAULT_MAX_DEPTH, PipelineConfig, PipelineOutcome};
pub use predict::Prediction;
pub use report::{
    ALGORITHM_NAME, AverageReport, ClassReport, ClassificationReport, ConfusionSummary,
    DatasetDistribution, DepthAnalysis, FeatureImportanceEntry, FeatureImportanceSummary,
    ModelInfo, Report,
};
pub use sweep::{DEFAULT_DEPTHS, DepthAccuracy, DepthSweep, SweepResult};
pub use tree::{DecisionTree, TreeConfig};
