use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};
use vts_model::{
    ResultRecord, SiteId, Trial, TrialDraft, TrialId, ValuesMap, VarietyId, VarietyMetadata,
    VarietyStatus, YearOutcome,
};

use crate::catalog::SiteCatalog;
use crate::error::{Result, StoreError};
use crate::repository::TrialStore;
use crate::snapshot::Snapshot;

/// Whole-dataset store held in memory.
///
/// Backs the JSON snapshot file and stands in for the record store in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    trials: Vec<Trial>,
    results: Vec<ResultRecord>,
    varieties: BTreeMap<VarietyId, VarietyMetadata>,
    sites: SiteCatalog,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sites(mut self, sites: SiteCatalog) -> Self {
        self.sites = sites;
        self
    }

    #[must_use]
    pub fn with_variety(mut self, variety: VarietyMetadata) -> Self {
        self.varieties.insert(variety.id.clone(), variety);
        self
    }

    /// Adds a trial as-is, without creation checks. Later duplicates replace earlier ones.
    #[must_use]
    pub fn with_trial(mut self, trial: Trial) -> Self {
        self.trials.retain(|existing| existing.id != trial.id);
        self.trials.push(trial);
        self
    }

    #[must_use]
    pub fn with_results(mut self, records: impl IntoIterator<Item = ResultRecord>) -> Self {
        self.results.extend(records);
        self
    }

    pub fn from_snapshot(snapshot: Snapshot, sites: SiteCatalog) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for trial in &snapshot.trials {
            if !seen.insert(&trial.id) {
                return Err(StoreError::DuplicateTrial {
                    id: trial.id.to_string(),
                });
            }
        }
        let varieties = snapshot
            .varieties
            .into_iter()
            .map(|variety| (variety.id.clone(), variety))
            .collect();
        Ok(Self {
            trials: snapshot.trials,
            results: snapshot.results,
            varieties,
            sites,
        })
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            trials: self.trials.clone(),
            results: self.results.clone(),
            varieties: self.varieties.values().cloned().collect(),
        }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    pub fn varieties(&self) -> impl Iterator<Item = &VarietyMetadata> {
        self.varieties.values()
    }

    pub fn sites(&self) -> &SiteCatalog {
        &self.sites
    }

    /// Creates a trial from a draft, naming participants from the variety registry.
    pub fn create_trial(&mut self, draft: TrialDraft) -> Result<Trial> {
        if let Some(id) = &draft.id
            && self.trials.iter().any(|trial| &trial.id == id)
        {
            return Err(StoreError::DuplicateTrial { id: id.to_string() });
        }
        let varieties = &self.varieties;
        let trial = draft.build(|id| varieties.get(id).map(|variety| variety.name.clone()))?;
        info!(
            trial_id = %trial.id,
            year = trial.year,
            culture = %trial.culture_id,
            participants = trial.participants.len(),
            "created trial"
        );
        self.trials.push(trial.clone());
        Ok(trial)
    }

    /// Replaces every stored result of the trial's participants with `values`.
    pub fn save_results(&mut self, trial_id: &TrialId, values: &ValuesMap) -> Result<usize> {
        let trial = self
            .trials
            .iter()
            .find(|trial| &trial.id == trial_id)
            .ok_or_else(|| StoreError::UnknownTrial {
                id: trial_id.to_string(),
            })?;
        if let Some(stranger) = values.keys().find(|pid| trial.participant(pid).is_none()) {
            return Err(StoreError::UnknownParticipant {
                trial: trial_id.to_string(),
                participant: stranger.to_string(),
            });
        }

        let participant_ids = trial.participant_ids();
        let before = self.results.len();
        self.results
            .retain(|record| !participant_ids.contains(&record.participant_id));
        let removed = before - self.results.len();

        let mut written = 0;
        for (participant_id, by_key) in values {
            for (key, raw) in by_key {
                self.results.push(ResultRecord::new(
                    participant_id.clone(),
                    key.clone(),
                    raw.clone(),
                ));
                written += 1;
            }
        }
        debug!(trial_id = %trial_id, removed, written, "replaced trial results");
        Ok(written)
    }

    /// Stores a trial-year outcome on the variety record and updates its status.
    ///
    /// Returns `false` when the variety is not registered.
    pub fn record_outcome(
        &mut self,
        variety_id: &VarietyId,
        region: &str,
        outcome: YearOutcome,
        status: VarietyStatus,
    ) -> bool {
        let Some(variety) = self.varieties.get_mut(variety_id) else {
            debug!(variety_id = %variety_id, "outcome for unregistered variety dropped");
            return false;
        };
        debug!(variety_id = %variety_id, region, year = outcome.year, %status, "recorded outcome");
        variety.upsert_year(region, outcome, status);
        true
    }
}

impl TrialStore for MemoryStore {
    fn list_trials(&self) -> Vec<Trial> {
        self.trials.clone()
    }

    fn list_results_for_trial(&self, trial: &Trial) -> Vec<ResultRecord> {
        let participant_ids = trial.participant_ids();
        self.results
            .iter()
            .filter(|record| participant_ids.contains(&record.participant_id))
            .cloned()
            .collect()
    }

    fn lookup_variety(&self, variety_id: &VarietyId) -> Option<VarietyMetadata> {
        self.varieties.get(variety_id).cloned()
    }

    fn lookup_region_for_site(&self, site_id: &SiteId) -> Option<String> {
        self.sites
            .region_for_site(site_id.as_str())
            .map(str::to_string)
    }

    fn lookup_site_name(&self, site_id: &SiteId) -> Option<String> {
        self.sites.site_name(site_id.as_str()).map(str::to_string)
    }

    fn get_trial(&self, trial_id: &TrialId) -> Option<Trial> {
        self.trials.iter().find(|trial| &trial.id == trial_id).cloned()
    }
}
