//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, Currency, Money};
use domain_claims::ClaimRecord;

/// Builder for claim records
pub struct ClaimRecordBuilder {
    claim_number: String,
    policy_number: String,
    purchase_date: NaiveDate,
    claim_date: NaiveDate,
    claimed_amount: Decimal,
    labor_cost: Option<Decimal>,
    part_cost: Option<Decimal>,
    mileage: Option<u32>,
    previous_claims: Option<u32>,
    product_model: Option<String>,
    part_replaced: Option<String>,
    description: String,
    currency: Currency,
}

impl Default for ClaimRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimRecordBuilder {
    /// Creates a builder with a plausible mid-range claim
    pub fn new() -> Self {
        Self {
            claim_number: "WC-1001".to_string(),
            policy_number: "PLCY-204".to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2023, 4, 12).expect("valid date"),
            claim_date: NaiveDate::from_ymd_opt(2025, 2, 3).expect("valid date"),
            claimed_amount: dec!(612.40),
            labor_cost: Some(dec!(220.00)),
            part_cost: Some(dec!(392.40)),
            mileage: Some(48_210),
            previous_claims: Some(0),
            product_model: Some("Meridian GT".to_string()),
            part_replaced: Some("alternator".to_string()),
            description: "No charge warning then dead battery".to_string(),
            currency: Currency::USD,
        }
    }

    pub fn with_claim_number(mut self, number: impl Into<String>) -> Self {
        self.claim_number = number.into();
        self
    }

    pub fn with_policy_number(mut self, number: impl Into<String>) -> Self {
        self.policy_number = number.into();
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.claimed_amount = amount;
        self
    }

    pub fn with_dates(mut self, purchase: NaiveDate, claim: NaiveDate) -> Self {
        self.purchase_date = purchase;
        self.claim_date = claim;
        self
    }

    pub fn with_mileage(mut self, mileage: Option<u32>) -> Self {
        self.mileage = mileage;
        self
    }

    pub fn with_previous_claims(mut self, count: Option<u32>) -> Self {
        self.previous_claims = count;
        self
    }

    pub fn with_part_replaced(mut self, part: impl Into<String>) -> Self {
        self.part_replaced = Some(part.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn without_costs(mut self) -> Self {
        self.labor_cost = None;
        self.part_cost = None;
        self
    }

    pub fn build(self) -> ClaimRecord {
        ClaimRecord {
            id: ClaimId::new_v7(),
            claim_number: self.claim_number,
            policy_number: self.policy_number,
            purchase_date: self.purchase_date,
            claim_date: self.claim_date,
            claimed_amount: Money::new(self.claimed_amount, self.currency),
            labor_cost: self.labor_cost.map(|d| Money::new(d, self.currency)),
            part_cost: self.part_cost.map(|d| Money::new(d, self.currency)),
            mileage: self.mileage,
            previous_claims: self.previous_claims,
            product_model: self.product_model,
            part_replaced: self.part_replaced,
            description: self.description,
        }
    }
}

/// A batch of builder-produced claims with spread-out amounts
pub fn claim_batch(amounts: &[i64]) -> Vec<ClaimRecord> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            ClaimRecordBuilder::new()
                .with_claim_number(format!("WC-{}", 2000 + i))
                .with_amount(Decimal::new(*amount, 0))
                .build()
        })
        .collect()
}
