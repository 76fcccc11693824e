use carebill::benchmarks::config;
use carebill::prelude::*;
use carebill_trees::DecisionTreeRegressor;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::SmallRng;

fn regression_tree_bench(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(42);

    // Controls how many samples are generated
    let training_set_sizes = &[100, 1000, 10000, 50000];
    let n_features = 18;

    let hyperparams = DecisionTreeRegressor::params().max_depth(Some(2));

    let mut group = c.benchmark_group("regression_tree");
    config::set_default_benchmark_configs(&mut group);

    for n in training_set_sizes.iter() {
        let train_x = Array2::random_using((*n, n_features), Uniform::new(0., 1.), &mut rng);
        let noise = Array1::random_using(*n, Uniform::new(-0.1, 0.1), &mut rng);
        let train_y = train_x.sum_axis(Axis(1)) + noise;
        let dataset = DatasetBase::new(train_x, train_y);

        group.bench_with_input(BenchmarkId::from_parameter(n), &dataset, |b, d| {
            b.iter(|| hyperparams.fit(d))
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = config::get_default_profiling_configs();
    targets = regression_tree_bench
}
criterion_main!(benches);
