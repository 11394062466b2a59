use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{CultureId, VarietyId};

/// Registry entry for a variety.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarietyMetadata {
    pub id: VarietyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture_id: Option<CultureId>,
    /// Breeding classification bucket, e.g. "D1 — mid-early".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_group: Option<String>,
    /// Status set by the most recently saved trial outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VarietyStatus>,
    /// Saved outcomes, grouped by region then year.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<RegionOutcomes>,
}

impl VarietyMetadata {
    pub fn new(id: VarietyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            culture_id: None,
            maturity_group: None,
            status: None,
            results: Vec::new(),
        }
    }

    /// Records a year outcome under `region`, replacing an earlier one for the same year.
    pub fn upsert_year(&mut self, region: &str, outcome: YearOutcome, status: VarietyStatus) {
        let index = match self.results.iter().position(|r| r.region == region) {
            Some(index) => index,
            None => {
                self.results.push(RegionOutcomes {
                    region: region.to_string(),
                    years: Vec::new(),
                });
                self.results.len() - 1
            }
        };
        let years = &mut self.results[index].years;
        match years.iter_mut().find(|year| year.year == outcome.year) {
            Some(existing) => *existing = outcome,
            None => years.push(outcome),
        }
        self.status = Some(status);
    }

    pub fn year_outcome(&self, region: &str, year: i32) -> Option<&YearOutcome> {
        self.results
            .iter()
            .find(|r| r.region == region)?
            .years
            .iter()
            .find(|y| y.year == year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionOutcomes {
    pub region: String,
    pub years: Vec<YearOutcome>,
}

/// Outcome of one trial year as shown on the variety card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearOutcome {
    pub year: i32,
    pub summary: String,
    pub rows: Vec<OutcomeRow>,
}

/// One compared indicator, with values already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRow {
    pub indicator: String,
    pub variety_value: String,
    pub standard_value: String,
    pub deviation: String,
    pub is_positive: bool,
}

/// Registration status of a variety under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarietyStatus {
    Testing,
    Approved,
    Rejected,
    Recommended,
    Extended,
    Removed,
}

impl VarietyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarietyStatus::Testing => "testing",
            VarietyStatus::Approved => "approved",
            VarietyStatus::Rejected => "rejected",
            VarietyStatus::Recommended => "recommended",
            VarietyStatus::Extended => "extended",
            VarietyStatus::Removed => "removed",
        }
    }
}

impl fmt::Display for VarietyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
