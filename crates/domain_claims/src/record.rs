//! Claim record as parsed from one input row

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, Money};

/// Numeric fields that participate in anomaly scoring
///
/// The scorer receives these by name so that per-field deviations can be
/// reported back against the input columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    ClaimedAmount,
    LaborCost,
    PartCost,
    Mileage,
    PreviousClaims,
}

impl NumericField {
    /// All scoreable fields, in input-column order
    pub const ALL: [NumericField; 5] = [
        NumericField::ClaimedAmount,
        NumericField::LaborCost,
        NumericField::PartCost,
        NumericField::Mileage,
        NumericField::PreviousClaims,
    ];

    /// The input column name this field maps to
    pub fn column(&self) -> &'static str {
        match self {
            NumericField::ClaimedAmount => "claimed_amount",
            NumericField::LaborCost => "labor_cost",
            NumericField::PartCost => "part_cost",
            NumericField::Mileage => "mileage",
            NumericField::PreviousClaims => "previous_claims",
        }
    }
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// A warranty claim as loaded from one row of the input table
///
/// The external `claim_number` and `policy_number` come from the file;
/// `id` is the internal handle assigned at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Internal identifier assigned at load time
    pub id: ClaimId,
    /// Claim number as supplied in the input file
    pub claim_number: String,
    /// Policy the claim is made against
    pub policy_number: String,
    /// Date the covered product was purchased
    pub purchase_date: NaiveDate,
    /// Date the claim was filed
    pub claim_date: NaiveDate,
    /// Total claimed amount
    pub claimed_amount: Money,
    /// Labor portion of the claimed cost
    pub labor_cost: Option<Money>,
    /// Parts portion of the claimed cost
    pub part_cost: Option<Money>,
    /// Odometer reading at failure, where applicable
    pub mileage: Option<u32>,
    /// Number of prior claims on the same policy
    pub previous_claims: Option<u32>,
    /// Product model designation
    pub product_model: Option<String>,
    /// Component that was replaced or repaired
    pub part_replaced: Option<String>,
    /// Free-text failure description
    pub description: String,
}

impl ClaimRecord {
    /// Returns the value of a numeric field as an f64, if present
    pub fn numeric_value(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::ClaimedAmount => Some(self.claimed_amount.to_f64()),
            NumericField::LaborCost => self.labor_cost.map(|m| m.to_f64()),
            NumericField::PartCost => self.part_cost.map(|m| m.to_f64()),
            NumericField::Mileage => self.mileage.map(f64::from),
            NumericField::PreviousClaims => self.previous_claims.map(f64::from),
        }
    }

    /// Days between purchase and claim filing
    pub fn days_in_service(&self) -> i64 {
        (self.claim_date - self.purchase_date).num_days()
    }

    /// Claim fields rendered as JSON for agent prompts
    pub fn to_prompt_json(&self) -> String {
        serde_json::json!({
            "claim_number": self.claim_number,
            "policy_number": self.policy_number,
            "purchase_date": self.purchase_date.to_string(),
            "claim_date": self.claim_date.to_string(),
            "days_in_service": self.days_in_service(),
            "claimed_amount": self.claimed_amount.amount(),
            "labor_cost": self.labor_cost.map(|m| m.amount()),
            "part_cost": self.part_cost.map(|m| m.amount()),
            "mileage": self.mileage,
            "previous_claims": self.previous_claims,
            "product_model": self.product_model,
            "part_replaced": self.part_replaced,
            "description": self.description,
        })
        .to_string()
    }
}
