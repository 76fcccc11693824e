use carebill::benchmarks::config;
use carebill::prelude::*;
use carebill_ensemble::RandomForestRegressor;
use carebill_datasets::generate::healthcare_records;
use carebill_preprocessing::ColumnTransformer;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn random_forest_bench(c: &mut Criterion) {
    let table = healthcare_records(2000, &mut SmallRng::seed_from_u64(42));
    let dataset = ColumnTransformer::new(
        vec!["Age", "Gender", "Blood Type", "Medical Condition"],
        vec!["Gender", "Blood Type", "Medical Condition"],
    )
    .fit(&table)
    .and_then(|fitted| fitted.transform_dataset(&table, "Billing Amount"))
    .unwrap();

    // Controls how many trees are fitted
    let trees_set_sizes = &[10, 100, 500];

    let mut group = c.benchmark_group("random_forest");
    config::set_default_benchmark_configs(&mut group);

    for ntrees in trees_set_sizes.iter() {
        let params = RandomForestRegressor::params()
            .n_estimators(*ntrees)
            .max_depth(Some(2));

        group.bench_with_input(BenchmarkId::from_parameter(ntrees), &dataset, |b, d| {
            b.iter(|| params.fit(d))
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = config::get_default_profiling_configs();
    targets = random_forest_bench
}
criterion_main!(benches);
