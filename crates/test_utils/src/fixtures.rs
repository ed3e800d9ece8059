//! Pre-built test data

use once_cell::sync::Lazy;

use domain_policy::{PassageIndex, PassageSplitter, PolicyCorpus};

/// A small but realistic warranty policy document
pub const STANDARD_POLICY: &str = "\
Section 1 - Powertrain. The engine, transmission, transfer case, and drive \
axle are covered for 60 months or 60,000 miles, whichever occurs first. \
Covered repairs include parts and labor performed at an authorized service \
center.

Section 2 - Electrical. The alternator, starter motor, onboard charger, and \
wiring harness are covered for 36 months. Batteries are covered only \
against manufacturing defects; gradual capacity loss is not a defect.

Section 3 - Exclusions. Wear items including brake pads, wiper blades, \
belts, and filters are excluded. Damage caused by neglect, misuse, \
racing, or unauthorized modification voids coverage for the affected \
component.

Section 4 - Claims. Claims must be filed within 30 days of failure and \
include proof of scheduled maintenance. Claims exceeding 5,000 dollars \
require prior authorization from the warranty administrator.";

/// CSV header matching the claim loader's expected columns
pub const CLAIMS_CSV_HEADER: &str = "claim_id,policy_id,purchase_date,claim_date,claimed_amount,labor_cost,part_cost,mileage,previous_claims,product_model,part_replaced,description";

/// A mixed claims file: ordinary rows, one outlier, one malformed row
pub static SAMPLE_CLAIMS_CSV: Lazy<String> = Lazy::new(|| {
    [
        CLAIMS_CSV_HEADER,
        "WC-1001,PLCY-204,2023-04-12,2025-02-03,612.40,220.00,392.40,48210,0,Meridian GT,alternator,No charge warning then dead battery",
        "WC-1002,PLCY-117,2024-01-30,2025-01-18,489.99,180.00,309.99,22104,1,Meridian LX,water pump,Coolant loss and overheating at idle",
        "WC-1003,PLCY-988,2023-11-02,2025-03-22,50000.00,1200.00,48800.00,60550,4,Meridian GT,engine,Total engine seizure reported after towing",
        "WC-1004,PLCY-362,2024-06-25,2025-02-14,not-a-number,,,,2,Meridian LX,brake pads,Squealing brakes",
        "WC-1005,PLCY-553,2024-03-09,2025-04-01,705.10,305.10,400.00,31870,0,Meridian GT,starter motor,Intermittent no-crank condition",
    ]
    .join("\n")
});

/// A pre-built retriever over [`STANDARD_POLICY`]
pub fn standard_retriever() -> domain_policy::IndexRetriever {
    let corpus = PolicyCorpus::from_text(STANDARD_POLICY, &PassageSplitter::default());
    domain_policy::IndexRetriever::new(PassageIndex::build(&corpus))
}

/// Strict-JSON agent replies in the wire shape each agent expects
pub mod replies {
    /// Policy-check reply with the given coverage ruling
    pub fn coverage(ruling: &str) -> String {
        format!(
            r#"{{"coverage": "{ruling}", "summary": "Assessed against the powertrain and exclusion sections.", "key_rules": ["Section 1 term limits", "Section 3 exclusions"]}}"#
        )
    }

    /// Fraud reply with the given score
    pub fn fraud(score: f64) -> String {
        format!(
            r#"{{"fraud_score": {score}, "reasons": ["claim compared against batch statistics"]}}"#
        )
    }

    /// Decision reply with the given verdict
    pub fn decision(verdict: &str) -> String {
        format!(
            r#"{{"decision": "{verdict}", "rationale": "Weighed coverage, fraud likelihood, and anomaly metrics.", "confidence": 0.86}}"#
        )
    }

    /// A reply wrapped in a Markdown fence, as models sometimes produce
    pub fn fenced(inner: &str) -> String {
        format!("```json\n{inner}\n```")
    }

    /// A reply that cannot be parsed as any agent payload
    pub fn prose() -> String {
        "After careful consideration, this claim seems fine.".to_string()
    }
}
