//! Feature importance ranking for a fitted tree.

use crate::tree::DecisionTree;

/// A feature name paired with its importance score.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Normalized importance score (sums to 1.0 across all features when the
    /// tree has at least one split).
    pub importance: f64,
}

impl DecisionTree {
    /// Return the features sorted by descending importance.
    ///
    /// The sort is stable: features with equal importance keep their
    /// training column order.
    #[must_use]
    pub fn ranked_features(&self) -> Vec<RankedFeature> {
        rank_importances(&self.importances, &self.feature_names)
    }
}

/// Pair importances with names and sort descending.
pub(crate) fn rank_importances(importances: &[f64], names: &[String]) -> Vec<RankedFeature> {
    let mut features: Vec<RankedFeature> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| RankedFeature {
            name: name.clone(),
            importance,
        })
        .collect();

    features.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    features
}
