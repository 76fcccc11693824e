use carebill::prelude::*;
use carebill_datasets::generate::healthcare_records;
use carebill_ensemble::RandomForestRegressor;
use carebill_preprocessing::ColumnTransformer;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn billing_dataset(n: usize) -> Dataset<f64, f64> {
    let table = healthcare_records(n, &mut StdRng::seed_from_u64(7));

    ColumnTransformer::new(
        vec!["Age", "Gender", "Blood Type", "Medical Condition"],
        vec!["Gender", "Blood Type", "Medical Condition"],
    )
    .fit(&table)
    .and_then(|fitted| fitted.transform_dataset(&table, "Billing Amount"))
    .expect("generated records are well formed")
}

#[test]
fn billing_forest_generalizes() {
    // reproducible split
    let mut rng = StdRng::seed_from_u64(42);
    let (train, test) = billing_dataset(1000)
        .shuffle(&mut rng)
        .split_with_ratio(0.8);

    assert_eq!(train.nsamples(), 800);
    assert_eq!(test.nsamples(), 200);

    let forest = RandomForestRegressor::params()
        .n_estimators(100)
        .max_depth(Some(2))
        .fit(&train)
        .expect("Training failed");

    let train_score = forest.predict(&train).r2(train.targets());
    let test_score = forest.predict(&test).r2(test.targets());

    assert!(train_score > 0.0 && train_score <= 1.0);
    assert!(test_score > 0.0, "test r2 was {}", test_score);

    let importances = forest.feature_importances();
    assert_eq!(importances.len(), train.nfeatures());
    assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn refitting_reproduces_the_scores() {
    let dataset = billing_dataset(400);
    let params = RandomForestRegressor::params()
        .n_estimators(25)
        .max_depth(Some(2));

    let first = params.fit(&dataset).expect("Training failed");
    let second = params.fit(&dataset).expect("Training failed");

    assert_eq!(first.predict(&dataset), second.predict(&dataset));
    assert_eq!(first.feature_importances(), second.feature_importances());
}
