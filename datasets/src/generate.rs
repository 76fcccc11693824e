//! Utility functions for randomly generating patient tables

use carebill::table::{Column, ColumnValues, Table};
use ndarray::Array1;
use ndarray_rand::{
    rand::{seq::SliceRandom, Rng},
    rand_distr::Uniform,
    RandomExt,
};

const GENDERS: [&str; 2] = ["Female", "Male"];
const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "AB+", "AB-", "B+", "B-", "O+", "O-"];
const CONDITIONS: [&str; 6] = [
    "Arthritis",
    "Asthma",
    "Cancer",
    "Diabetes",
    "Hypertension",
    "Obesity",
];
const INSURERS: [&str; 5] = ["Aetna", "Blue Cross", "Cigna", "Medicare", "UnitedHealthcare"];
const ADMISSIONS: [&str; 3] = ["Elective", "Emergency", "Urgent"];
const MEDICATIONS: [&str; 5] = ["Aspirin", "Ibuprofen", "Lipitor", "Paracetamol", "Penicillin"];
const RESULTS: [&str; 3] = ["Abnormal", "Inconclusive", "Normal"];

/// Generate `n` synthetic patient encounters
///
/// The table has the same fifteen columns as the real billing dataset. `Billing Amount` depends
/// on age, medical condition and blood group plus uniform noise, so a regression model has some
/// signal to find. The same `rng` state always produces the same table.
pub fn healthcare_records(n: usize, rng: &mut impl Rng) -> Table {
    let genders = pick(&GENDERS, n, rng);
    let blood_types = pick(&BLOOD_TYPES, n, rng);
    let conditions = pick(&CONDITIONS, n, rng);
    let insurers = pick(&INSURERS, n, rng);
    let admissions = pick(&ADMISSIONS, n, rng);
    let medications = pick(&MEDICATIONS, n, rng);
    let results = pick(&RESULTS, n, rng);

    let ages: Vec<i64> = (0..n).map(|_| rng.gen_range(18..=89)).collect();
    let rooms: Vec<i64> = (0..n).map(|_| rng.gen_range(101..=500)).collect();
    let stays: Vec<u32> = (0..n).map(|_| rng.gen_range(1..=30)).collect();
    let admitted: Vec<u32> = (0..n).map(|_| rng.gen_range(0..330)).collect();
    let noise: Array1<f64> = Array1::random_using(n, Uniform::new(-2500., 2500.), rng);

    let billing = (0..n)
        .map(|i| {
            let condition = CONDITIONS
                .iter()
                .position(|c| *c == conditions[i])
                .unwrap_or(0) as f64;
            let negative = if blood_types[i].ends_with('-') { 1.0 } else { 0.0 };

            5000. + 3000. * condition + 120. * ages[i] as f64 + 1500. * negative + noise[i]
        })
        .collect();

    let columns = vec![
        Column::new(
            "Name",
            ColumnValues::Str((0..n).map(|i| format!("Patient {}", i + 1)).collect()),
        ),
        Column::new("Age", ColumnValues::Int(ages)),
        Column::new("Gender", ColumnValues::Str(genders)),
        Column::new("Blood Type", ColumnValues::Str(blood_types)),
        Column::new("Medical Condition", ColumnValues::Str(conditions)),
        Column::new(
            "Date of Admission",
            ColumnValues::Str(admitted.iter().map(|&day| date(day)).collect()),
        ),
        Column::new(
            "Doctor",
            ColumnValues::Str((0..n).map(|i| format!("Doctor {}", i % 40)).collect()),
        ),
        Column::new(
            "Hospital",
            ColumnValues::Str((0..n).map(|i| format!("Hospital {}", i % 25)).collect()),
        ),
        Column::new("Insurance Provider", ColumnValues::Str(insurers)),
        Column::new("Billing Amount", ColumnValues::Float(billing)),
        Column::new("Room Number", ColumnValues::Int(rooms)),
        Column::new("Admission Type", ColumnValues::Str(admissions)),
        Column::new(
            "Discharge Date",
            ColumnValues::Str(
                admitted
                    .iter()
                    .zip(&stays)
                    .map(|(&day, &stay)| date(day + stay))
                    .collect(),
            ),
        ),
        Column::new("Medication", ColumnValues::Str(medications)),
        Column::new("Test Results", ColumnValues::Str(results)),
    ];

    // every column has `n` rows and the names are distinct
    Table::new(columns).unwrap_or_default()
}

fn pick(choices: &[&str], n: usize, rng: &mut impl Rng) -> Vec<String> {
    (0..n)
        .map(|_| {
            choices
                .choose(&mut *rng)
                .map(|x| x.to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// Calendar date of the `day`th day of 2023, with every month counted as 30 days
fn date(day: u32) -> String {
    format!("2023-{:02}-{:02}", (day / 30) % 12 + 1, day % 30 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn has_the_full_column_set() {
        let table = healthcare_records(50, &mut SmallRng::seed_from_u64(42));

        assert_eq!(table.nrows(), 50);
        assert_eq!(table.ncols(), 15);
        for name in &["Age", "Gender", "Blood Type", "Medical Condition", "Billing Amount"] {
            assert!(table.column(name).is_some(), "missing {}", name);
        }
        assert!(table.column("Age").unwrap().is_numeric());
        assert!(!table.column("Gender").unwrap().is_numeric());
    }

    #[test]
    fn is_reproducible() {
        let a = healthcare_records(20, &mut SmallRng::seed_from_u64(1));
        let b = healthcare_records(20, &mut SmallRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn billing_amounts_are_positive() {
        let table = healthcare_records(200, &mut SmallRng::seed_from_u64(3));
        let billing = table.column("Billing Amount").unwrap().to_f64().unwrap();

        assert!(billing.iter().all(|&x| x > 0.0 && x.is_finite()));
    }

    #[test]
    fn categories_come_from_fixed_vocabularies() {
        let table = healthcare_records(100, &mut SmallRng::seed_from_u64(5));

        for value in table.column("Blood Type").unwrap().to_strings() {
            assert!(BLOOD_TYPES.contains(&value.as_str()));
        }
    }

    #[test]
    fn dates_stay_in_range() {
        assert_eq!(date(0), "2023-01-01");
        assert_eq!(date(359), "2023-12-30");
        assert_eq!(date(360), "2023-01-01");
    }
}
