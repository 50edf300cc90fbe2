//! Criterion benchmarks for hardpoint-tree: training, prediction, depth sweep.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hardpoint_tree::{Dataset, DepthSweep, HoldoutSplit, Outcome, TreeConfig};

fn make_matches(n_samples: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let row: Vec<f64> = (0..10).map(|_| rng.r#gen::<f64>() * 3.0).collect();
        let score = row[7] + 0.3 * row[8] - 0.2 * row[1];
        labels.push(if score > 1.6 { Outcome::Win } else { Outcome::Loss });
        features.push(row);
    }
    let names = (0..10).map(|f| format!("f{f}")).collect();
    Dataset::new(names, features, labels).unwrap()
}

fn bench_tree_train(c: &mut Criterion) {
    let ds = make_matches(2000, 42);
    let cfg = TreeConfig::new(10);

    c.bench_function("tree_train_2000x10_depth10", |b| {
        b.iter(|| cfg.fit(&ds).unwrap());
    });
}

fn bench_tree_predict_batch(c: &mut Criterion) {
    let ds = make_matches(2000, 42);
    let tree = TreeConfig::new(10).fit(&ds).unwrap();

    c.bench_function("tree_predict_batch_2000x10", |b| {
        b.iter(|| tree.predict_batch(ds.features()).unwrap());
    });
}

fn bench_depth_sweep(c: &mut Criterion) {
    let ds = make_matches(2000, 42);
    let split = HoldoutSplit::default().split(&ds).unwrap();
    let sweep = DepthSweep::default();
    let base = TreeConfig::new(5);

    c.bench_function("depth_sweep_2000x10_6depths", |b| {
        b.iter(|| sweep.run(&base, &split.train, &split.test).unwrap());
    });
}

criterion_group!(benches, bench_tree_train, bench_tree_predict_batch, bench_depth_sweep);
criterion_main!(benches);
