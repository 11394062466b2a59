//! Year outcome per variety, derived when a trial's results are saved.

use serde::Serialize;
use tracing::debug;
use vts_model::{
    OutcomeRow, ResultRecord, SiteId, Trial, TrialId, VarietyId, VarietyStatus, YearOutcome,
};

use crate::resolver::ResolvedResults;
use crate::stats;

/// Improvement at or above this percentage recommends the variety.
pub const RECOMMEND_THRESHOLD_PCT: f64 = 8.0;
/// Improvement at or below this percentage removes the variety.
pub const REMOVE_THRESHOLD_PCT: f64 = -5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VarietyOutcome {
    pub trial_id: TrialId,
    pub variety_id: VarietyId,
    pub variety_name: String,
    pub location_id: SiteId,
    pub year: i32,
    pub is_standard: bool,
    pub variety_mean: f64,
    pub standard_mean: f64,
    /// Variety mean minus standard mean.
    pub deviation: f64,
    pub improvement_pct: Option<f64>,
    pub summary: String,
    pub status: VarietyStatus,
}

/// Label of the compared indicator in stored outcome rows.
pub const YIELD_ROW_LABEL: &str = "Yield, c/ha";

impl VarietyOutcome {
    /// The year record stored on the variety: the summary plus one yield row.
    pub fn year_outcome(&self) -> YearOutcome {
        YearOutcome {
            year: self.year,
            summary: self.summary.clone(),
            rows: vec![OutcomeRow {
                indicator: YIELD_ROW_LABEL.to_string(),
                variety_value: format!("{:.2}", self.variety_mean),
                standard_value: format!("{:.2}", self.standard_mean),
                deviation: format!("{:+.2}", self.deviation),
                is_positive: self.deviation >= 0.0,
            }],
        }
    }
}

/// Status implied by the improvement over the standard. A trial whose
/// standard averages zero has no improvement and extends every entrant.
pub fn recommend_status(improvement_pct: Option<f64>) -> VarietyStatus {
    match improvement_pct {
        Some(pct) if pct >= RECOMMEND_THRESHOLD_PCT => VarietyStatus::Recommended,
        Some(pct) if pct <= REMOVE_THRESHOLD_PCT => VarietyStatus::Removed,
        _ => VarietyStatus::Extended,
    }
}

pub fn summary_line(improvement_pct: Option<f64>) -> String {
    match improvement_pct {
        Some(pct) => format!("Excess over standard: {pct:+.1}%"),
        None => "Excess over standard: n/a".to_string(),
    }
}

/// Outcomes for every participant with a full plot set.
///
/// Empty when the trial has no standard or the standard lacks a full plot set.
pub fn summarize_trial(trial: &Trial, records: &[ResultRecord]) -> Vec<VarietyOutcome> {
    let resolved = ResolvedResults::resolve(trial, records);
    let Some(standard) = resolved.standard() else {
        debug!(trial = %trial.id, "no standard; skipping outcomes");
        return Vec::new();
    };
    let Some(standard_mean) = resolved.plot_mean(&standard.id) else {
        debug!(trial = %trial.id, "standard has no full plot set; skipping outcomes");
        return Vec::new();
    };

    trial
        .participants
        .iter()
        .filter_map(|participant| {
            let variety_mean = resolved.plot_mean(&participant.id)?;
            let improvement_pct =
                stats::standard_relative_delta(Some(variety_mean), Some(standard_mean));
            Some(VarietyOutcome {
                trial_id: trial.id.clone(),
                variety_id: participant.variety_id.clone(),
                variety_name: participant.variety_name.clone(),
                location_id: trial.location_id.clone(),
                year: trial.year,
                is_standard: participant.id == standard.id,
                variety_mean,
                standard_mean,
                deviation: variety_mean - standard_mean,
                improvement_pct,
                summary: summary_line(improvement_pct),
                status: recommend_status(improvement_pct),
            })
        })
        .collect()
}
