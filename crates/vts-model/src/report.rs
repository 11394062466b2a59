//! Aggregated multi-year report tree: region -> site -> maturity group -> variety row.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::{CultureId, SiteId, VarietyId};

/// Selection criteria for a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub culture_id: CultureId,
    pub years: BTreeSet<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl ReportFilter {
    pub fn new(culture_id: CultureId, years: impl IntoIterator<Item = i32>) -> Self {
        Self {
            culture_id,
            years: years.into_iter().collect(),
            predecessor: None,
            region: None,
        }
    }

    #[must_use]
    pub fn with_predecessor(mut self, predecessor: impl Into<String>) -> Self {
        self.predecessor = Some(predecessor.into());
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn year_list(&self) -> Vec<i32> {
        self.years.iter().copied().collect()
    }
}

/// Secondary agronomic indicators for one year. Each field is filled independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearIndicators {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veg_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thousand_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resist_shatter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resist_lodge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resist_drought: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smut: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stem_rust: Option<f64>,
}

impl YearIndicators {
    pub fn is_empty(&self) -> bool {
        self.veg_days.is_none()
            && self.thousand_weight.is_none()
            && self.resist_shatter.is_none()
            && self.resist_lodge.is_none()
            && self.resist_drought.is_none()
            && self.smut.is_none()
            && self.stem_rust.is_none()
    }

    /// Overlays the present fields of `other` onto `self`.
    pub fn merge(&mut self, other: &YearIndicators) {
        fn overlay(target: &mut Option<f64>, source: Option<f64>) {
            if source.is_some() {
                *target = source;
            }
        }
        overlay(&mut self.veg_days, other.veg_days);
        overlay(&mut self.thousand_weight, other.thousand_weight);
        overlay(&mut self.resist_shatter, other.resist_shatter);
        overlay(&mut self.resist_lodge, other.resist_lodge);
        overlay(&mut self.resist_drought, other.resist_drought);
        overlay(&mut self.smut, other.smut);
        overlay(&mut self.stem_rust, other.stem_rust);
    }
}

/// Per-variety aggregate within a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub variety_id: VarietyId,
    pub variety_name: String,
    pub maturity_group: String,
    /// Mean plot yield per requested year; `None` unless all four plots were valid.
    pub yield_by_year: BTreeMap<i32, Option<f64>>,
    #[serde(default)]
    pub indicators_by_year: BTreeMap<i32, YearIndicators>,
    pub multi_year_average: Option<f64>,
}

impl ReportRow {
    pub fn new(
        variety_id: VarietyId,
        variety_name: impl Into<String>,
        maturity_group: impl Into<String>,
        years: &BTreeSet<i32>,
    ) -> Self {
        Self {
            variety_id,
            variety_name: variety_name.into(),
            maturity_group: maturity_group.into(),
            yield_by_year: years.iter().map(|year| (*year, None)).collect(),
            indicators_by_year: BTreeMap::new(),
            multi_year_average: None,
        }
    }

    pub fn yield_for(&self, year: i32) -> Option<f64> {
        self.yield_by_year.get(&year).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGroup {
    pub maturity_group: String,
    pub rows: Vec<ReportRow>,
    pub default_standard_variety_id: Option<VarietyId>,
}

impl ReportGroup {
    pub fn default_standard(&self) -> Option<&ReportRow> {
        let id = self.default_standard_variety_id.as_ref()?;
        self.rows.iter().find(|row| &row.variety_id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSite {
    pub site_id: SiteId,
    pub site_name: String,
    pub years: Vec<i32>,
    pub groups: Vec<ReportGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRegion {
    pub region: String,
    pub years: Vec<i32>,
    pub sites: Vec<ReportSite>,
}

impl ReportRegion {
    /// Region entry with no sites, used when a requested region has no data yet.
    pub fn scaffold(region: impl Into<String>, years: Vec<i32>) -> Self {
        Self {
            region: region.into(),
            years,
            sites: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTree {
    pub filter: ReportFilter,
    pub regions: Vec<ReportRegion>,
}

impl ReportTree {
    pub fn row_count(&self) -> usize {
        self.regions
            .iter()
            .flat_map(|region| &region.sites)
            .flat_map(|site| &site.groups)
            .map(|group| group.rows.len())
            .sum()
    }

    pub fn site_count(&self) -> usize {
        self.regions.iter().map(|region| region.sites.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}
