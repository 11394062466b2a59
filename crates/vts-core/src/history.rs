use serde::Serialize;
use vts_model::{ResultRecord, SiteId, TrialId, VarietyId};
use vts_store::TrialStore;

/// One trial a variety took part in, with that participant's raw records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VarietyTrialEntry {
    pub trial_id: TrialId,
    pub year: i32,
    pub trial_type: Option<String>,
    pub location_id: SiteId,
    pub site_name: String,
    pub is_standard: bool,
    pub records: Vec<ResultRecord>,
}

/// Trials with at least one result for `variety_id`, ordered by year then trial id.
pub fn variety_history<S>(store: &S, variety_id: &VarietyId) -> Vec<VarietyTrialEntry>
where
    S: TrialStore + ?Sized,
{
    let mut entries: Vec<VarietyTrialEntry> = store
        .list_trials()
        .into_iter()
        .filter_map(|trial| {
            let participant = trial.participant_for_variety(variety_id)?;
            let records: Vec<ResultRecord> = store
                .list_results_for_trial(&trial)
                .into_iter()
                .filter(|record| record.participant_id == participant.id)
                .collect();
            if records.is_empty() {
                return None;
            }
            Some(VarietyTrialEntry {
                site_name: store
                    .lookup_site_name(&trial.location_id)
                    .unwrap_or_else(|| trial.location_id.to_string()),
                is_standard: participant.is_standard,
                trial_id: trial.id.clone(),
                year: trial.year,
                trial_type: trial.trial_type.clone(),
                location_id: trial.location_id.clone(),
                records,
            })
        })
        .collect();
    entries.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.trial_id.cmp(&b.trial_id)));
    entries
}
