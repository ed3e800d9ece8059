//! Property-based test data generators

use fake::faker::lorem::en::Sentence;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::ClaimRecord;

use crate::builders::ClaimRecordBuilder;

/// Strategy for plausible claim amounts in minor units (1.00 to 100,000.00)
pub fn claim_amount_minor() -> impl Strategy<Value = i64> {
    100i64..10_000_000i64
}

/// Strategy for odometer readings
pub fn mileage() -> impl Strategy<Value = Option<u32>> {
    prop_oneof![
        3 => (0u32..250_000u32).prop_map(Some),
        1 => Just(None),
    ]
}

/// Strategy for prior claim counts
pub fn previous_claims() -> impl Strategy<Value = Option<u32>> {
    prop_oneof![
        3 => (0u32..12u32).prop_map(Some),
        1 => Just(None),
    ]
}

/// Strategy producing full claim records with varied numeric fields
pub fn claim_record() -> impl Strategy<Value = ClaimRecord> {
    (claim_amount_minor(), mileage(), previous_claims(), 0u32..5000u32).prop_map(
        |(amount_minor, mileage, previous, seq)| {
            let description: String = Sentence(3..8).fake();
            ClaimRecordBuilder::new()
                .with_claim_number(format!("WC-P{seq}"))
                .with_amount(Decimal::new(amount_minor, 2))
                .with_mileage(mileage)
                .with_previous_claims(previous)
                .with_description(description)
                .build()
        },
    )
}
