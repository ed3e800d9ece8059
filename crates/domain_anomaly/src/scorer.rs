//! Per-claim anomaly assessment

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stats::HistoricalProfile;

/// Thresholds governing flags and risk buckets
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// A claim is flagged when any single field deviates at least this many
    /// standard deviations from the historical mean
    pub flag_sigma: f64,
    /// Average z-score above which a claim lands in the high bucket
    pub high_bucket: f64,
    /// Average z-score above which a claim lands in the medium bucket
    pub medium_bucket: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            flag_sigma: 3.0,
            high_bucket: 2.5,
            medium_bucket: 1.5,
        }
    }
}

/// Coarse risk classification from the averaged z-score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBucket::Low => "low",
            RiskBucket::Medium => "medium",
            RiskBucket::High => "high",
        }
    }
}

impl std::fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The anomaly layer's output for one claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyAssessment {
    /// Average absolute z-score across the fields that had statistics
    pub score: f64,
    /// Risk bucket derived from the score
    pub bucket: RiskBucket,
    /// Per-field absolute z-scores
    pub field_scores: BTreeMap<String, f64>,
    /// True when any single field breached the flag threshold
    pub flagged: bool,
}

impl AnomalyAssessment {
    /// Assessment for a claim with no scoreable fields
    pub fn unscored() -> Self {
        Self {
            score: 0.0,
            bucket: RiskBucket::Low,
            field_scores: BTreeMap::new(),
            flagged: false,
        }
    }
}

/// Scores claims against a batch profile
#[derive(Debug, Clone, Default)]
pub struct AnomalyScorer {
    config: AnomalyConfig,
}

impl AnomalyScorer {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Assesses one claim's field values against the historical profile
    ///
    /// Fields without statistics (or without a value on this claim) are
    /// skipped; a claim with no overlap scores 0.0 in the low bucket.
    pub fn assess(
        &self,
        values: &BTreeMap<String, f64>,
        profile: &HistoricalProfile,
    ) -> AnomalyAssessment {
        let mut field_scores = BTreeMap::new();
        let mut total = 0.0;
        let mut flagged = false;

        for (field, value) in values {
            if !value.is_finite() {
                continue;
            }
            let Some(stats) = profile.get(field) else {
                continue;
            };
            let z = stats.z_score(*value);
            if z >= self.config.flag_sigma {
                flagged = true;
            }
            total += z;
            field_scores.insert(field.clone(), z);
        }

        if field_scores.is_empty() {
            return AnomalyAssessment::unscored();
        }

        let score = total / field_scores.len() as f64;
        let bucket = if score > self.config.high_bucket {
            RiskBucket::High
        } else if score > self.config.medium_bucket {
            RiskBucket::Medium
        } else {
            RiskBucket::Low
        };

        debug!(score, %bucket, flagged, "Scored claim against batch profile");

        AnomalyAssessment {
            score,
            bucket,
            field_scores,
            flagged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::FieldStats;

    fn profile_500_100() -> HistoricalProfile {
        let mut profile = HistoricalProfile::new();
        profile.insert(
            "claimed_amount",
            FieldStats {
                mean: 500.0,
                std_dev: 100.0,
            },
        );
        profile
    }

    fn values(amount: f64) -> BTreeMap<String, f64> {
        BTreeMap::from([("claimed_amount".to_string(), amount)])
    }

    #[test]
    fn fifty_thousand_against_500_mean_flags() {
        let scorer = AnomalyScorer::default();
        let assessment = scorer.assess(&values(50_000.0), &profile_500_100());

        assert!(assessment.flagged);
        assert_eq!(assessment.bucket, RiskBucket::High);
        assert!((assessment.score - 495.0).abs() < 1e-9);
    }

    #[test]
    fn typical_amount_does_not_flag() {
        let scorer = AnomalyScorer::default();
        let assessment = scorer.assess(&values(550.0), &profile_500_100());

        assert!(!assessment.flagged);
        assert_eq!(assessment.bucket, RiskBucket::Low);
    }

    #[test]
    fn bucket_boundaries_follow_config() {
        let scorer = AnomalyScorer::default();

        // avg z = 2.0 -> medium
        let medium = scorer.assess(&values(700.0), &profile_500_100());
        assert_eq!(medium.bucket, RiskBucket::Medium);

        // avg z = 2.6 -> high
        let high = scorer.assess(&values(760.0), &profile_500_100());
        assert_eq!(high.bucket, RiskBucket::High);
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let scorer = AnomalyScorer::default();
        let mut vals = values(500.0);
        vals.insert("mileage".to_string(), 1e9);

        let assessment = scorer.assess(&vals, &profile_500_100());
        assert_eq!(assessment.field_scores.len(), 1);
        assert!(!assessment.flagged);
    }

    #[test]
    fn no_overlap_scores_zero() {
        let scorer = AnomalyScorer::default();
        let assessment = scorer.assess(&BTreeMap::new(), &profile_500_100());

        assert_eq!(assessment.score, 0.0);
        assert!(!assessment.flagged);
        assert_eq!(assessment.bucket, RiskBucket::Low);
    }
}
