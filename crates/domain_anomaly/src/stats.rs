//! Per-field historical statistics

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Floor substituted when a field's deviation is zero or undefined, so
/// z-scores stay finite.
pub const MIN_STD_DEV: f64 = 1e-6;

/// Mean and sample standard deviation for one numeric field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl FieldStats {
    /// Computes stats over the observed values, ignoring non-finite entries.
    ///
    /// Returns `None` when no finite values are present. Uses the sample
    /// standard deviation (n - 1); a single observation or an all-equal
    /// column gets the `MIN_STD_DEV` floor.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;

        let std_dev = if finite.len() < 2 {
            MIN_STD_DEV
        } else {
            let variance =
                finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            let sd = variance.sqrt();
            if sd.is_finite() && sd > 0.0 {
                sd
            } else {
                MIN_STD_DEV
            }
        };

        Some(Self { mean, std_dev })
    }

    /// Absolute z-score of a value against these stats
    pub fn z_score(&self, value: f64) -> f64 {
        ((value - self.mean) / self.std_dev).abs()
    }
}

/// Historical statistics for every scoreable field in a batch
///
/// Built once per batch before any claim is scored; read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalProfile {
    fields: BTreeMap<String, FieldStats>,
}

impl HistoricalProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a profile from named columns of observed values
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut profile = Self::new();
        for (name, values) in columns {
            if let Some(stats) = FieldStats::from_values(&values) {
                profile.fields.insert(name.into(), stats);
            }
        }
        profile
    }

    pub fn insert(&mut self, field: impl Into<String>, stats: FieldStats) {
        self.fields.insert(field.into(), stats);
    }

    pub fn get(&self, field: &str) -> Option<&FieldStats> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Field names with statistics, in stable order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
