//! End-to-end behavior of the tree on match-shaped data.
//!
//! The synthetic datasets use the ten-column match feature layout with
//! `Kill_Death_Ratio` as the only informative column.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hardpoint_tree::{
    ClassWeights, Dataset, DepthSweep, HoldoutSplit, Node, Outcome, PipelineConfig, TreeConfig,
    accuracy, evaluate,
};

const KDR: usize = 7;

fn feature_names() -> Vec<String> {
    [
        "Kills",
        "Deaths",
        "Damage Done",
        "Assists",
        "Score",
        "Skill",
        "Percentage Of Time Moving",
        "Kill_Death_Ratio",
        "Damage_Efficiency",
        "Accuracy",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ---------------------------------------------------------------------------
// Helper: KDR-separable dataset
// ---------------------------------------------------------------------------

/// Losses have KDR in [0.2, 1.4], wins in [1.6, 3.4]; every other column is
/// uniform noise independent of the label.
fn kdr_separable(n_per_class: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for i in 0..2 * n_per_class {
        let outcome = if i % 2 == 0 { Outcome::Loss } else { Outcome::Win };
        let step = (i / 2) % 7;
        let kdr = match outcome {
            Outcome::Loss => 0.2 + 0.2 * step as f64,
            Outcome::Win => 1.6 + 0.3 * step as f64,
        };
        let mut row: Vec<f64> = (0..10).map(|_| rng.gen_range(0.0..100.0)).collect();
        row[KDR] = kdr;
        features.push(row);
        labels.push(outcome);
    }
    Dataset::new(feature_names(), features, labels).unwrap()
}

/// Label depends on KDR with 15% of labels flipped.
fn noisy(n: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for _ in 0..n {
        let mut row: Vec<f64> = (0..10).map(|_| rng.gen_range(0.0..100.0)).collect();
        let kdr: f64 = rng.gen_range(0.0..3.0);
        row[KDR] = kdr;
        let flip = rng.gen_bool(0.15);
        let win = (kdr > 1.5) != flip;
        labels.push(if win { Outcome::Win } else { Outcome::Loss });
        features.push(row);
    }
    Dataset::new(feature_names(), features, labels).unwrap()
}

#[test]
fn depth_one_splits_on_kill_death_ratio() {
    let train = kdr_separable(20, 42);
    let tree = TreeConfig::new(1).fit(&train).unwrap();

    match tree.root() {
        Node::Split {
            feature,
            threshold,
            left,
            right,
            ..
        } => {
            assert_eq!(feature.index(), KDR);
            assert!((threshold - 1.5).abs() < 1e-9, "threshold = {threshold}");
            assert!(matches!(
                **left,
                Node::Leaf { prediction: Outcome::Loss, class_counts: [_, 0], .. }
            ));
            assert!(matches!(
                **right,
                Node::Leaf { prediction: Outcome::Win, class_counts: [0, _], .. }
            ));
        }
        Node::Leaf { .. } => panic!("expected a root split"),
    }

    let acc = accuracy(&tree, &train).unwrap();
    assert!((acc - 1.0).abs() < f64::EPSILON);

    let sample = [
        10.0,
        2.0,
        2000.0,
        3.0,
        4000.0,
        80.0,
        55.0,
        10.0 / 3.0,
        2000.0 / 2001.0,
        0.4,
    ];
    assert_eq!(tree.predict(&sample).unwrap(), Outcome::Win);
    assert_eq!(tree.ranked_features()[0].name, "Kill_Death_Ratio");
}

#[test]
fn predicted_labels_come_from_training_set() {
    let all_win = Dataset::new(
        vec!["x".into()],
        vec![vec![1.0], vec![2.0], vec![3.0]],
        vec![Outcome::Win; 3],
    )
    .unwrap();
    let tree = TreeConfig::new(5).fit(&all_win).unwrap();
    let probe = noisy(50, 9);
    for row in probe.features() {
        assert_eq!(tree.predict(&row[..1]).unwrap(), Outcome::Win);
    }
}

#[test]
fn same_inputs_give_identical_trees() {
    let ds = noisy(200, 11);
    let config = TreeConfig::new(6).with_class_weights(ClassWeights::default());
    assert_eq!(config.fit(&ds).unwrap(), config.fit(&ds).unwrap());
}

#[test]
fn holdout_accuracy_beats_chance_on_noisy_data() {
    let ds = noisy(400, 5);
    let split = HoldoutSplit::new(0.25).unwrap().with_seed(7).split(&ds).unwrap();
    let tree = TreeConfig::new(3).fit(&split.train).unwrap();
    let eval = evaluate(&tree, &split.test).unwrap();
    assert!(eval.accuracy > 0.7, "accuracy = {}", eval.accuracy);
    assert_eq!(eval.confusion_matrix.total(), split.test.n_samples());
}

#[test]
fn sweep_best_is_maximum() {
    let ds = noisy(300, 21);
    let split = HoldoutSplit::default().split(&ds).unwrap();
    let result = DepthSweep::default()
        .run(&TreeConfig::new(5), &split.train, &split.test)
        .unwrap();
    let best = result.best().unwrap();
    assert!(result.results.iter().all(|r| best.accuracy >= r.accuracy));
    let first_max = result
        .results
        .iter()
        .find(|r| r.accuracy == best.accuracy)
        .unwrap();
    assert_eq!(first_max.depth, best.depth);
}

#[test]
fn pipeline_report_matches_outcome() {
    let ds = noisy(150, 2);
    let outcome = PipelineConfig::new().run(&ds).unwrap();
    let report = &outcome.report;
    assert_eq!(report.model_info.tree_depth, outcome.model.depth());
    assert_eq!(report.model_info.leaf_nodes, outcome.model.n_leaves());
    assert_eq!(report.feature_importance.features.len(), 10);
    let dist = report.dataset_distribution;
    assert_eq!(
        dist.train_wins + dist.train_losses + dist.test_wins + dist.test_losses,
        150
    );
    let cm = &report.confusion_matrix;
    assert_eq!(
        cm.true_negatives + cm.false_positives + cm.false_negatives + cm.true_positives,
        outcome.split.test.n_samples()
    );
}
