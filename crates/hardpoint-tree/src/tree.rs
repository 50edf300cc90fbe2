use tracing::{debug, instrument};

use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::label::{ClassWeights, N_CLASSES, Outcome};
use crate::node::{Impurity, Node};
use crate::split::{find_best_split, gini, weigh};

/// Configuration for a single weighted CART decision tree.
///
/// Construct via [`TreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default                   |
/// |---------------------|---------------------------|
/// | `class_weights`     | loss 1.0, win 2.0         |
/// | `min_samples_split` | 2                         |
///
/// `max_depth` has no default: it is the one required hyperparameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeConfig {
    pub(crate) max_depth: i64,
    pub(crate) class_weights: ClassWeights,
    pub(crate) min_samples_split: usize,
}

impl TreeConfig {
    /// Create a config with the given maximum depth (root is depth 0).
    ///
    /// The depth is validated by [`TreeConfig::fit`] so that a negative value
    /// surfaces as [`TreeError::InvalidDepth`] at training time.
    #[must_use]
    pub fn new(max_depth: i64) -> Self {
        Self {
            max_depth,
            class_weights: ClassWeights::default(),
            min_samples_split: 2,
        }
    }

    /// Set the per-class weights.
    #[must_use]
    pub fn with_class_weights(mut self, class_weights: ClassWeights) -> Self {
        self.class_weights = class_weights;
        self
    }

    /// Return a copy of this config with a different maximum depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: i64) -> Self {
        self.max_depth = max_depth;
        self
    }

    // --- Getters ---

    /// Return the maximum depth bound.
    #[must_use]
    pub fn max_depth(&self) -> i64 {
        self.max_depth
    }

    /// Return the per-class weights.
    #[must_use]
    pub fn class_weights(&self) -> ClassWeights {
        self.class_weights
    }

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Train a decision tree on `train`.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::InvalidDepth`] | `max_depth` is negative |
    /// | [`TreeError::EmptyDataset`] | `train` has zero samples |
    #[instrument(skip_all, fields(n_samples = train.n_samples(), max_depth = self.max_depth))]
    pub fn fit(&self, train: &Dataset) -> Result<DecisionTree, TreeError> {
        if self.max_depth < 0 {
            return Err(TreeError::InvalidDepth {
                max_depth: self.max_depth,
            });
        }
        if train.is_empty() {
            return Err(TreeError::EmptyDataset);
        }

        let n_features = train.n_features();
        let weights = self.class_weights.as_array();

        // Column-major layout for split scanning.
        let col_features: Vec<Vec<f64>> = (0..n_features)
            .map(|feat_idx| train.features().iter().map(|row| row[feat_idx]).collect())
            .collect();

        let total_weight: f64 = weigh(&train.class_counts(), &weights).iter().sum();
        let builder = Builder {
            col_features: &col_features,
            labels: train.labels(),
            weights,
            total_weight,
            max_depth: self.max_depth as usize,
            min_samples_split: self.min_samples_split,
        };

        let sample_indices: Vec<usize> = (0..train.n_samples()).collect();
        let root = builder.build(&sample_indices, 0);

        let importances = feature_importances(&root, n_features);

        debug!(
            n_nodes = root.n_nodes(),
            n_leaves = root.n_leaves(),
            depth = root.depth(),
            "decision tree built"
        );

        Ok(DecisionTree {
            root,
            feature_names: train.feature_names().to_vec(),
            class_weights: self.class_weights,
            importances,
        })
    }
}

/// Borrowed training state shared by every recursive call.
struct Builder<'a> {
    col_features: &'a [Vec<f64>],
    labels: &'a [Outcome],
    weights: [f64; N_CLASSES],
    total_weight: f64,
    max_depth: usize,
    min_samples_split: usize,
}

impl Builder<'_> {
    fn build(&self, sample_indices: &[usize], depth: usize) -> Node {
        let n_samples = sample_indices.len();

        let mut class_counts = [0usize; N_CLASSES];
        for &si in sample_indices {
            class_counts[self.labels[si].index()] += 1;
        }
        let weighted = weigh(&class_counts, &self.weights);
        let impurity = gini(&weighted);

        let depth_reached = depth >= self.max_depth;
        let too_few = n_samples < self.min_samples_split;
        let pure = class_counts.iter().filter(|&&c| c > 0).count() <= 1;

        if depth_reached || too_few || pure {
            return make_leaf(class_counts, weighted, impurity, n_samples);
        }

        let Some(split) = find_best_split(
            self.col_features,
            self.labels,
            sample_indices,
            &self.weights,
            impurity,
        ) else {
            return make_leaf(class_counts, weighted, impurity, n_samples);
        };

        let node_weight: f64 = weighted.iter().sum();
        let impurity_decrease =
            (node_weight / self.total_weight) * (impurity.value() - split.child_impurity);

        let left = self.build(&split.left_indices, depth + 1);
        let right = self.build(&split.right_indices, depth + 1);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
            impurity,
            n_samples,
            weighted_samples: node_weight,
            impurity_decrease,
        }
    }
}

/// Build a leaf predicting the weighted-majority class.
///
/// Ties go to the first class in `[loss, win]` order.
fn make_leaf(
    class_counts: [usize; N_CLASSES],
    weighted: [f64; N_CLASSES],
    impurity: Impurity,
    n_samples: usize,
) -> Node {
    let total: f64 = weighted.iter().sum();
    let mut distribution = [0.0; N_CLASSES];
    if total > 0.0 {
        for c in 0..N_CLASSES {
            distribution[c] = weighted[c] / total;
        }
    }
    let mut best = 0usize;
    for c in 1..N_CLASSES {
        if weighted[c] > weighted[best] {
            best = c;
        }
    }
    let prediction = Outcome::from_index(best).unwrap_or(Outcome::Loss);
    Node::Leaf {
        prediction,
        class_counts,
        distribution,
        impurity,
        n_samples,
    }
}

/// Mean Decrease in Impurity per feature, normalized to sum to 1.0.
///
/// All zeros when the tree is a single leaf.
fn feature_importances(root: &Node, n_features: usize) -> Vec<f64> {
    let mut totals = vec![0.0f64; n_features];
    root.for_each_split(&mut |feature, decrease| totals[feature.index()] += decrease);
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }
    totals
}

/// A fitted weighted decision tree plus the feature ordering it was trained on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) root: Node,
    pub(crate) feature_names: Vec<String>,
    pub(crate) class_weights: ClassWeights,
    pub(crate) importances: Vec<f64>,
}

impl DecisionTree {
    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Return the feature names in training order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the number of features the model expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return the class weights used during training.
    #[must_use]
    pub fn class_weights(&self) -> ClassWeights {
        self.class_weights
    }

    /// Return normalized feature importances in feature order.
    #[must_use]
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Return the maximum depth of the tree. A single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    /// Return the total number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root.n_nodes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: Vec<Vec<f64>>, labels: Vec<Outcome>) -> Dataset {
        let names = (0..rows[0].len()).map(|i| format!("f{i}")).collect();
        Dataset::new(names, rows, labels).unwrap()
    }

    fn separable() -> Dataset {
        dataset(
            vec![
                vec![1.0, 0.0],
                vec![2.0, 0.0],
                vec![3.0, 0.0],
                vec![10.0, 0.0],
                vec![11.0, 0.0],
                vec![12.0, 0.0],
            ],
            vec![
                Outcome::Loss,
                Outcome::Loss,
                Outcome::Loss,
                Outcome::Win,
                Outcome::Win,
                Outcome::Win,
            ],
        )
    }

    #[test]
    fn empty_dataset_error() {
        let ds = Dataset::new(vec!["x".into()], vec![], vec![]).unwrap();
        let err = TreeConfig::new(3).fit(&ds).unwrap_err();
        assert!(matches!(err, TreeError::EmptyDataset));
    }

    #[test]
    fn negative_depth_error() {
        let err = TreeConfig::new(-1).fit(&separable()).unwrap_err();
        assert!(matches!(err, TreeError::InvalidDepth { max_depth: -1 }));
    }

    #[test]
    fn depth_zero_is_single_leaf() {
        let tree = TreeConfig::new(0).fit(&separable()).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert!(tree.feature_importances().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let ds = dataset(
            vec![vec![1.0], vec![3.0], vec![5.0]],
            vec![Outcome::Win, Outcome::Win, Outcome::Win],
        );
        let tree = TreeConfig::new(5).fit(&ds).unwrap();
        assert_eq!(tree.n_leaves(), 1);
        assert!(matches!(
            tree.root(),
            Node::Leaf { prediction: Outcome::Win, class_counts: [0, 3], .. }
        ));
    }

    #[test]
    fn linearly_separable_correct_split() {
        let tree = TreeConfig::new(3).fit(&separable()).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
        match tree.root() {
            Node::Split { feature, threshold, .. } => {
                assert_eq!(feature.index(), 0);
                assert!((threshold - 6.5).abs() < 1e-12);
            }
            Node::Leaf { .. } => panic!("expected a split at the root"),
        }
    }

    #[test]
    fn weighted_majority_favors_win() {
        // 3 loss vs 2 win is a raw loss majority, but win weight 2.0 makes 4.0 > 3.0.
        let ds = dataset(
            vec![vec![1.0]; 5],
            vec![Outcome::Loss, Outcome::Loss, Outcome::Loss, Outcome::Win, Outcome::Win],
        );
        let tree = TreeConfig::new(3).fit(&ds).unwrap();
        assert!(matches!(tree.root(), Node::Leaf { prediction: Outcome::Win, .. }));

        let unweighted = TreeConfig::new(3)
            .with_class_weights(ClassWeights::new(1.0, 1.0).unwrap())
            .fit(&ds)
            .unwrap();
        assert!(matches!(unweighted.root(), Node::Leaf { prediction: Outcome::Loss, .. }));
    }

    #[test]
    fn weighted_tie_goes_to_loss() {
        // 2 loss (weight 2.0) vs 1 win (weight 2.0).
        let ds = dataset(
            vec![vec![1.0]; 3],
            vec![Outcome::Loss, Outcome::Loss, Outcome::Win],
        );
        let tree = TreeConfig::new(3).fit(&ds).unwrap();
        assert!(matches!(tree.root(), Node::Leaf { prediction: Outcome::Loss, .. }));
    }

    #[test]
    fn max_depth_limits_tree() {
        let rows: Vec<Vec<f64>> = (0..16).map(|i| vec![i as f64]).collect();
        // Alternating blocks of 2 need depth > 1 to separate.
        let labels = (0..16)
            .map(|i| if (i / 2) % 2 == 0 { Outcome::Loss } else { Outcome::Win })
            .collect();
        let ds = dataset(rows, labels);
        for depth in [1, 2, 3] {
            let tree = TreeConfig::new(depth).fit(&ds).unwrap();
            assert!(tree.depth() <= depth as usize);
        }
    }

    #[test]
    fn xor_without_strict_reduction_stays_leaf() {
        let ds = dataset(
            vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
            vec![Outcome::Loss, Outcome::Win, Outcome::Win, Outcome::Loss],
        );
        let tree = TreeConfig::new(5)
            .with_class_weights(ClassWeights::new(1.0, 1.0).unwrap())
            .fit(&ds)
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn feature_importances_sum_to_one() {
        let ds = dataset(
            vec![
                vec![1.0, 100.0],
                vec![2.0, 300.0],
                vec![3.0, 200.0],
                vec![10.0, 100.0],
                vec![11.0, 300.0],
                vec![12.0, 150.0],
                vec![4.0, 310.0],
            ],
            vec![
                Outcome::Loss,
                Outcome::Loss,
                Outcome::Loss,
                Outcome::Win,
                Outcome::Win,
                Outcome::Win,
                Outcome::Win,
            ],
        );
        let tree = TreeConfig::new(4).fit(&ds).unwrap();
        let importances = tree.feature_importances();
        assert!(importances.iter().all(|&v| v >= 0.0));
        let sum: f64 = importances.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10, "sum = {sum}");
    }

    #[test]
    fn single_split_importance_is_all_on_one_feature() {
        let tree = TreeConfig::new(3).fit(&separable()).unwrap();
        assert_eq!(tree.feature_importances(), &[1.0, 0.0]);
    }

    #[test]
    fn importances_follow_weighted_decrease() {
        // Root splits f0 (weight 8, G 0.375 -> 0.25); its left child splits
        // f1 (weight 4, G 0.5 -> 0). Decreases 1.0 * 0.125 and 0.5 * 0.5.
        let ds = dataset(
            vec![
                vec![0.0, 0.0],
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![1.0, 0.0],
            ],
            vec![Outcome::Loss, Outcome::Loss, Outcome::Win, Outcome::Win, Outcome::Win],
        );
        let tree = TreeConfig::new(5).fit(&ds).unwrap();
        assert_eq!(tree.n_nodes(), 5);

        let mut decreases = Vec::new();
        tree.root()
            .for_each_split(&mut |f, d| decreases.push((f.index(), d)));
        assert_eq!(decreases.len(), 2);
        assert_eq!(decreases[0].0, 0);
        assert!((decreases[0].1 - 0.125).abs() < 1e-12);
        assert_eq!(decreases[1].0, 1);
        assert!((decreases[1].1 - 0.25).abs() < 1e-12);

        let importances = tree.feature_importances();
        assert!((importances[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((importances[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn adjacent_values_never_yield_empty_leaf() {
        let ds = dataset(
            vec![vec![1.000_000_000_000_000_2], vec![1.000_000_000_000_000_4]],
            vec![Outcome::Loss, Outcome::Win],
        );
        let tree = TreeConfig::new(3).fit(&ds).unwrap();
        assert_eq!(tree.depth(), 1);
        match tree.root() {
            Node::Split { left, right, .. } => {
                assert!(matches!(
                    **left,
                    Node::Leaf { prediction: Outcome::Loss, n_samples: 1, .. }
                ));
                assert!(matches!(
                    **right,
                    Node::Leaf { prediction: Outcome::Win, n_samples: 1, .. }
                ));
            }
            Node::Leaf { .. } => panic!("expected a split at the root"),
        }
    }

    #[test]
    fn deterministic_structure() {
        let ds = dataset(
            vec![
                vec![1.0, 5.0],
                vec![2.0, 9.0],
                vec![3.0, 7.0],
                vec![10.0, 15.0],
                vec![11.0, 1.0],
                vec![12.0, 17.0],
            ],
            vec![
                Outcome::Loss,
                Outcome::Win,
                Outcome::Loss,
                Outcome::Win,
                Outcome::Loss,
                Outcome::Win,
            ],
        );
        let a = TreeConfig::new(4).fit(&ds).unwrap();
        let b = TreeConfig::new(4).fit(&ds).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn model_keeps_feature_names() {
        let tree = TreeConfig::new(2).fit(&separable()).unwrap();
        assert_eq!(tree.feature_names(), &["f0".to_string(), "f1".to_string()]);
        assert_eq!(tree.n_features(), 2);
    }
}
