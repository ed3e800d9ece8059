//! Tabular claim ingestion
//!
//! Reads claims from CSV. A malformed row never aborts the batch: it is
//! captured as a [`RejectedRow`] with the offending field and reason, and
//! the remaining rows continue through parsing.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use core_kernel::{ClaimId, Currency, Money};

use crate::error::ClaimError;
use crate::record::ClaimRecord;

/// One raw CSV row before validation
#[derive(Debug, Deserialize)]
struct RawClaimRow {
    claim_id: Option<String>,
    policy_id: Option<String>,
    purchase_date: Option<String>,
    claim_date: Option<String>,
    claimed_amount: Option<String>,
    labor_cost: Option<String>,
    part_cost: Option<String>,
    mileage: Option<String>,
    previous_claims: Option<String>,
    product_model: Option<String>,
    part_replaced: Option<String>,
    description: Option<String>,
}

/// A row excluded from automated scoring, flagged for manual entry correction
#[derive(Debug, Clone, serde::Serialize)]
pub struct RejectedRow {
    /// 1-based line number in the input file (excluding the header)
    pub line: u64,
    /// The claim number, when the row carried one
    pub claim_number: Option<String>,
    /// Why the row was rejected
    pub reason: String,
}

/// Result of loading one claims file
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub records: Vec<ClaimRecord>,
    pub rejects: Vec<RejectedRow>,
}

impl LoadedBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.rejects.is_empty()
    }
}

/// CSV claim loader
///
/// Amounts are parsed leniently: a leading currency symbol and thousands
/// separators are accepted ("$1,249.50"). Dates must be ISO `YYYY-MM-DD`.
#[derive(Debug, Clone)]
pub struct ClaimLoader {
    currency: Currency,
}

impl Default for ClaimLoader {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
        }
    }
}

impl ClaimLoader {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    /// Loads claims from a CSV file on disk
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedBatch, ClaimError> {
        let file = std::fs::File::open(path)?;
        self.load_reader(file)
    }

    /// Loads claims from any CSV reader
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedBatch, ClaimError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut batch = LoadedBatch::default();

        for (index, row) in csv_reader.deserialize::<RawClaimRow>().enumerate() {
            let line = index as u64 + 1;
            let raw = match row {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(line, error = %err, "Skipping unreadable claim row");
                    batch.rejects.push(RejectedRow {
                        line,
                        claim_number: None,
                        reason: format!("unreadable row: {err}"),
                    });
                    continue;
                }
            };

            let claim_number = raw.claim_id.clone().filter(|s| !s.is_empty());
            match self.parse_row(raw) {
                Ok(record) => batch.records.push(record),
                Err(err) => {
                    warn!(line, claim = ?claim_number, error = %err, "Rejecting malformed claim row");
                    batch.rejects.push(RejectedRow {
                        line,
                        claim_number,
                        reason: err.to_string(),
                    });
                }
            }
        }

        debug!(
            accepted = batch.records.len(),
            rejected = batch.rejects.len(),
            "Loaded claims table"
        );
        Ok(batch)
    }

    fn parse_row(&self, raw: RawClaimRow) -> Result<ClaimRecord, ClaimError> {
        let claim_number = required(raw.claim_id, "claim_id")?;
        let policy_number = required(raw.policy_id, "policy_id")?;
        let purchase_date = parse_date(required(raw.purchase_date, "purchase_date")?, "purchase_date")?;
        let claim_date = parse_date(required(raw.claim_date, "claim_date")?, "claim_date")?;

        if claim_date < purchase_date {
            return Err(ClaimError::ClaimPrecedesPurchase {
                claim: claim_date,
                purchase: purchase_date,
            });
        }

        let claimed_amount =
            self.parse_amount(&required(raw.claimed_amount, "claimed_amount")?, "claimed_amount")?;
        if claimed_amount.is_negative() {
            return Err(ClaimError::InvalidAmount {
                field: "claimed_amount",
                value: claimed_amount.to_string(),
            });
        }

        Ok(ClaimRecord {
            id: ClaimId::new_v7(),
            claim_number,
            policy_number,
            purchase_date,
            claim_date,
            claimed_amount,
            labor_cost: self.parse_optional_amount(raw.labor_cost, "labor_cost")?,
            part_cost: self.parse_optional_amount(raw.part_cost, "part_cost")?,
            mileage: parse_optional_int(raw.mileage, "mileage")?,
            previous_claims: parse_optional_int(raw.previous_claims, "previous_claims")?,
            product_model: raw.product_model.filter(|s| !s.is_empty()),
            part_replaced: raw.part_replaced.filter(|s| !s.is_empty()),
            description: raw.description.unwrap_or_default(),
        })
    }

    fn parse_amount(&self, value: &str, field: &'static str) -> Result<Money, ClaimError> {
        let cleaned: String = value
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        let amount: Decimal = cleaned.parse().map_err(|_| ClaimError::InvalidAmount {
            field,
            value: value.to_string(),
        })?;
        Ok(Money::new(amount, self.currency))
    }

    fn parse_optional_amount(
        &self,
        value: Option<String>,
        field: &'static str,
    ) -> Result<Option<Money>, ClaimError> {
        match value.filter(|s| !s.is_empty()) {
            Some(v) => Ok(Some(self.parse_amount(&v, field)?)),
            None => Ok(None),
        }
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ClaimError> {
    value
        .filter(|s| !s.is_empty())
        .ok_or(ClaimError::MissingField { field })
}

fn parse_date(value: String, field: &'static str) -> Result<NaiveDate, ClaimError> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| ClaimError::InvalidDate {
        field,
        value,
    })
}

fn parse_optional_int(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<u32>, ClaimError> {
    match value.filter(|s| !s.is_empty()) {
        Some(v) => v
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ClaimError::InvalidNumber {
                field,
                value: v,
            }),
        None => Ok(None),
    }
}
