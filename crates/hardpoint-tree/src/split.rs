use crate::label::{N_CLASSES, Outcome};
use crate::node::{FeatureIndex, Impurity};

/// Smallest impurity reduction that counts as a real improvement.
///
/// Absorbs floating-point noise so that splits which only reshuffle
/// rounding error are rejected.
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

/// Weighted Gini impurity: `1 - Σ(p_c²)` with `p_c = w_c / Σw`.
///
/// Returns [`Impurity::new(0.0)`] when the total weight is zero.
#[must_use]
pub(crate) fn gini(weighted_counts: &[f64; N_CLASSES]) -> Impurity {
    let total: f64 = weighted_counts.iter().sum();
    if total <= 0.0 {
        return Impurity::new(0.0);
    }
    let sum_sq: f64 = weighted_counts
        .iter()
        .map(|&w| {
            let p = w / total;
            p * p
        })
        .sum();
    Impurity::new(1.0 - sum_sq)
}

/// Multiply raw class counts by their class weights.
#[must_use]
pub(crate) fn weigh(counts: &[usize; N_CLASSES], weights: &[f64; N_CLASSES]) -> [f64; N_CLASSES] {
    let mut out = [0.0; N_CLASSES];
    for c in 0..N_CLASSES {
        out[c] = counts[c] as f64 * weights[c];
    }
    out
}

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Feature used for the split.
    pub(crate) feature: FeatureIndex,
    /// Threshold value.
    pub(crate) threshold: f64,
    /// Weight-averaged impurity of the two children.
    pub(crate) child_impurity: f64,
    /// Sample indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Threshold between two consecutive distinct sorted values.
///
/// The result always satisfies `lo <= t < hi`, so `<= t` sends `lo` left and
/// `hi` right. Halving first avoids overflow near `f64::MAX`; when the
/// rounded midpoint collapses onto `hi` (adjacent floats) `lo` is used.
fn midpoint(lo: f64, hi: f64) -> f64 {
    let t = lo / 2.0 + hi / 2.0;
    if t >= hi || !t.is_finite() { lo } else { t }
}

/// Find the split that minimizes weighted child impurity.
///
/// Features are scanned in ascending index order. For each, the node's
/// `(value, sample)` pairs are sorted and scanned left-to-right with
/// incremental class counts; every midpoint between consecutive distinct
/// values is a candidate. Only a strictly better candidate replaces the
/// current best, so ties keep the earliest feature and then the lowest
/// threshold.
///
/// Returns `None` when no candidate exists (all values identical) or when
/// the best candidate does not strictly reduce `parent_impurity`.
///
/// # Column-major layout
///
/// `features` is column-major: `features[feature_idx][sample_idx]`.
/// `sample_indices` are indices into these inner Vecs.
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    labels: &[Outcome],
    sample_indices: &[usize],
    class_weights: &[f64; N_CLASSES],
    parent_impurity: Impurity,
) -> Option<SplitResult> {
    let n_samples = sample_indices.len();
    if n_samples < 2 || features.is_empty() {
        return None;
    }

    let mut parent_counts = [0usize; N_CLASSES];
    for &si in sample_indices {
        parent_counts[labels[si].index()] += 1;
    }
    let total_weight: f64 = weigh(&parent_counts, class_weights).iter().sum();

    let mut best_child = f64::INFINITY;
    let mut best: Option<(FeatureIndex, f64)> = None;

    for (feat_idx, feat_col) in features.iter().enumerate() {
        let mut sorted: Vec<(f64, usize)> = sample_indices
            .iter()
            .map(|&si| (feat_col[si], si))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Left grows from empty, right shrinks from full.
        let mut left_counts = [0usize; N_CLASSES];
        let mut right_counts = parent_counts;

        for i in 0..(n_samples - 1) {
            let (val_i, si) = sorted[i];
            let class_i = labels[si].index();
            left_counts[class_i] += 1;
            right_counts[class_i] -= 1;

            let val_next = sorted[i + 1].0;
            if val_i == val_next {
                continue;
            }

            let left_w = weigh(&left_counts, class_weights);
            let right_w = weigh(&right_counts, class_weights);
            let w_left: f64 = left_w.iter().sum();
            let w_right: f64 = right_w.iter().sum();

            let child = (w_left * gini(&left_w).value() + w_right * gini(&right_w).value())
                / total_weight;

            if child < best_child {
                best_child = child;
                best = Some((FeatureIndex::new(feat_idx), midpoint(val_i, val_next)));
            }
        }
    }

    let (feature, threshold) = best?;
    if parent_impurity.value() - best_child <= MIN_IMPURITY_DECREASE {
        return None;
    }

    let feat_col = &features[feature.index()];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .copied()
        .partition(|&si| feat_col[si] <= threshold);

    Some(SplitResult {
        feature,
        threshold,
        child_impurity: best_child,
        left_indices,
        right_indices,
    })
}
