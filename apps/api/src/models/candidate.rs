use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One saint in the candidate pool.
///
/// Category memberships arrive as extra boolean keys on the pool record
/// (`{"id": "...", "name": "...", "martyrs": true, "popes": false}`), so they
/// are collected through a flattened map rather than fixed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity_signal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub categories: BTreeMap<String, bool>,
}

impl Candidate {
    /// True when the candidate carries the membership flag for `key`.
    pub fn is_in(&self, key: &str) -> bool {
        self.categories.get(key).copied().unwrap_or(false)
    }

    /// Popularity used by the weighted samplers. Candidates without a signal rank lowest.
    pub fn popularity(&self) -> f64 {
        self.popularity_signal
            .filter(|s| s.is_finite())
            .unwrap_or(0.0)
    }

    /// Whether the exclusion window bars this candidate in `year`.
    pub fn recently_used(&self, year: i32, years_to_exclude: u32) -> bool {
        match self.last_used_year {
            Some(last) => i64::from(year) - i64::from(last) < i64::from(years_to_exclude),
            None => false,
        }
    }
}
