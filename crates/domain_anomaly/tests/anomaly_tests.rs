//! Batch-level anomaly scoring properties

use std::collections::BTreeMap;

use domain_anomaly::{
    AnomalyConfig, AnomalyScorer, FieldStats, HistoricalProfile, RiskBucket,
};

fn single_field_profile(mean: f64, std_dev: f64) -> HistoricalProfile {
    let mut profile = HistoricalProfile::new();
    profile.insert("claimed_amount", FieldStats { mean, std_dev });
    profile
}

fn amount(value: f64) -> BTreeMap<String, f64> {
    BTreeMap::from([("claimed_amount".to_string(), value)])
}

#[test]
fn profile_built_from_batch_columns_matches_hand_computation() {
    let profile = HistoricalProfile::from_columns(vec![(
        "claimed_amount",
        vec![300.0, 500.0, 700.0],
    )]);
    let stats = profile.get("claimed_amount").unwrap();

    assert!((stats.mean - 500.0).abs() < 1e-9);
    assert!((stats.std_dev - 200.0).abs() < 1e-9);
}

#[test]
fn repeated_scoring_is_bit_identical() {
    let profile = HistoricalProfile::from_columns(vec![
        ("claimed_amount", vec![420.0, 515.0, 610.0, 480.0]),
        ("mileage", vec![30_000.0, 42_000.0, 55_000.0, 38_500.0]),
    ]);
    let scorer = AnomalyScorer::default();
    let mut vals = amount(505.0);
    vals.insert("mileage".to_string(), 47_250.0);

    let first = scorer.assess(&vals, &profile);
    let second = scorer.assess(&vals, &profile);

    assert_eq!(first.score.to_bits(), second.score.to_bits());
    assert_eq!(first.field_scores, second.field_scores);
    assert_eq!(first.bucket, second.bucket);
    assert_eq!(first.flagged, second.flagged);
}

#[test]
fn custom_flag_sigma_is_respected() {
    let scorer = AnomalyScorer::new(AnomalyConfig {
        flag_sigma: 2.0,
        ..AnomalyConfig::default()
    });
    let profile = single_field_profile(500.0, 100.0);

    // z = 2.1, above the custom threshold but below the default 3.0
    let assessment = scorer.assess(&amount(710.0), &profile);
    assert!(assessment.flagged);
}

#[test]
fn bucket_ordering_is_monotonic_in_deviation() {
    let scorer = AnomalyScorer::default();
    let profile = single_field_profile(500.0, 100.0);

    let low = scorer.assess(&amount(520.0), &profile);
    let medium = scorer.assess(&amount(680.0), &profile);
    let high = scorer.assess(&amount(900.0), &profile);

    assert_eq!(low.bucket, RiskBucket::Low);
    assert_eq!(medium.bucket, RiskBucket::Medium);
    assert_eq!(high.bucket, RiskBucket::High);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any amount at least flag_sigma standard deviations from the
        /// mean sets the anomaly flag.
        #[test]
        fn beyond_sigma_always_flags(
            mean in -1.0e6f64..1.0e6,
            std_dev in 0.01f64..1.0e4,
            // Margin above the threshold keeps float cancellation in
            // mean + sigmas * std_dev from rounding the z-score below it
            sigmas in 3.01f64..50.0,
            sign in prop::bool::ANY,
        ) {
            let profile = single_field_profile(mean, std_dev);
            let scorer = AnomalyScorer::default();
            let direction = if sign { 1.0 } else { -1.0 };
            let value = mean + direction * sigmas * std_dev;

            let assessment = scorer.assess(&amount(value), &profile);
            prop_assert!(assessment.flagged);
        }

        /// Values within one standard deviation never flag under the default
        /// threshold.
        #[test]
        fn within_one_sigma_never_flags(
            mean in -1.0e6f64..1.0e6,
            std_dev in 0.01f64..1.0e4,
            fraction in -0.99f64..0.99,
        ) {
            let profile = single_field_profile(mean, std_dev);
            let scorer = AnomalyScorer::default();
            let value = mean + fraction * std_dev;

            let assessment = scorer.assess(&amount(value), &profile);
            prop_assert!(!assessment.flagged);
            prop_assert_eq!(assessment.bucket, RiskBucket::Low);
        }
    }
}
