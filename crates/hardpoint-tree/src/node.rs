use std::fmt;

use crate::label::{N_CLASSES, Outcome};

/// Zero-based feature column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Create a new feature index from a zero-based column position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weighted Gini impurity of a node.
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd,
    serde::Serialize, serde::Deserialize,
)]
pub struct Impurity(f64);

impl Impurity {
    /// Create a new impurity value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A node in a decision tree.
///
/// Each `Split` exclusively owns its two children; the tree is a plain
/// recursive value with no sharing and no back-references.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior split node.
    Split {
        /// Feature used for the split.
        feature: FeatureIndex,
        /// Threshold value: samples with feature <= threshold go left.
        threshold: f64,
        /// Subtree for samples with `feature <= threshold`.
        left: Box<Node>,
        /// Subtree for samples with `feature > threshold`.
        right: Box<Node>,
        /// Impurity at this node before splitting.
        impurity: Impurity,
        /// Number of training samples that reached this node.
        n_samples: usize,
        /// Sum of class weights of the training samples at this node.
        weighted_samples: f64,
        /// Impurity decrease from this split, scaled by the node's share of
        /// the total training weight.
        impurity_decrease: f64,
    },
    /// A terminal leaf node.
    Leaf {
        /// Predicted outcome (weighted majority).
        prediction: Outcome,
        /// Raw training sample counts in `[loss, win]` order.
        class_counts: [usize; N_CLASSES],
        /// Weighted class proportions in `[loss, win]` order.
        distribution: [f64; N_CLASSES],
        /// Impurity at this leaf.
        impurity: Impurity,
        /// Number of training samples in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the impurity at this node (before splitting for interior nodes).
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Return the depth of the subtree rooted here. A leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Return the number of leaves in the subtree rooted here.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    /// Return the total number of nodes (splits and leaves) in the subtree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.n_nodes() + right.n_nodes(),
        }
    }

    /// Walk down from this node and return the leaf `sample` lands in.
    ///
    /// The caller guarantees `sample` has at least as many values as the
    /// largest feature index used by the subtree.
    pub(crate) fn leaf_for(&self, sample: &[f64]) -> &Node {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { .. } => return node,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if sample[feature.index()] <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                }
            }
        }
    }

    /// Call `visit` on every split node in the subtree, parents first.
    pub(crate) fn for_each_split(&self, visit: &mut impl FnMut(FeatureIndex, f64)) {
        if let Node::Split {
            feature,
            impurity_decrease,
            left,
            right,
            ..
        } = self
        {
            visit(*feature, *impurity_decrease);
            left.for_each_split(visit);
            right.for_each_split(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureIndex, Impurity, Node};
    use crate::label::Outcome;

    #[test]
    fn feature_index_roundtrip() {
        let fi = FeatureIndex::new(7);
        assert_eq!(fi.index(), 7);
        assert_eq!(format!("{fi}"), "7");
    }

    #[test]
    fn impurity_display() {
        let imp = Impurity::new(0.333333);
        assert_eq!(format!("{imp}"), "0.333333");
    }

    fn leaf(prediction: Outcome, n_samples: usize) -> Node {
        let class_counts = match prediction {
            Outcome::Loss => [n_samples, 0],
            Outcome::Win => [0, n_samples],
        };
        let distribution = match prediction {
            Outcome::Loss => [1.0, 0.0],
            Outcome::Win => [0.0, 1.0],
        };
        Node::Leaf {
            prediction,
            class_counts,
            distribution,
            impurity: Impurity::new(0.0),
            n_samples,
        }
    }

    fn split(feature: usize, threshold: f64, left: Node, right: Node) -> Node {
        let n_samples = left.n_samples() + right.n_samples();
        Node::Split {
            feature: FeatureIndex::new(feature),
            threshold,
            left: Box::new(left),
            right: Box::new(right),
            impurity: Impurity::new(0.5),
            n_samples,
            weighted_samples: n_samples as f64,
            impurity_decrease: 0.5,
        }
    }

    #[test]
    fn single_leaf_shape() {
        let node = leaf(Outcome::Win, 4);
        assert!(node.is_leaf());
        assert_eq!(node.depth(), 0);
        assert_eq!(node.n_leaves(), 1);
        assert_eq!(node.n_nodes(), 1);
    }

    #[test]
    fn nested_shape() {
        // split(0) -> [leaf, split(1) -> [leaf, leaf]]
        let tree = split(
            0,
            1.0,
            leaf(Outcome::Loss, 3),
            split(1, 5.0, leaf(Outcome::Win, 2), leaf(Outcome::Loss, 1)),
        );
        assert!(!tree.is_leaf());
        assert_eq!(tree.n_samples(), 6);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.n_nodes(), 5);
    }

    #[test]
    fn leaf_for_follows_threshold() {
        let tree = split(0, 1.0, leaf(Outcome::Loss, 1), leaf(Outcome::Win, 1));
        assert!(matches!(
            tree.leaf_for(&[1.0]),
            Node::Leaf { prediction: Outcome::Loss, .. }
        ));
        assert!(matches!(
            tree.leaf_for(&[1.5]),
            Node::Leaf { prediction: Outcome::Win, .. }
        ));
    }

    #[test]
    fn for_each_split_visits_parents_first() {
        let tree = split(
            2,
            1.0,
            leaf(Outcome::Loss, 3),
            split(0, 5.0, leaf(Outcome::Win, 2), leaf(Outcome::Loss, 1)),
        );
        let mut seen = Vec::new();
        tree.for_each_split(&mut |f, _| seen.push(f.index()));
        assert_eq!(seen, vec![2, 0]);
    }
}
