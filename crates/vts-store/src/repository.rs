use vts_model::{ResultRecord, SiteId, Trial, TrialId, VarietyId, VarietyMetadata};

/// Read access to trial records, variety metadata, and site geography.
///
/// The reporting core only ever reads through this trait. Implementations
/// return owned snapshots; callers may hold them across calls.
pub trait TrialStore {
    fn list_trials(&self) -> Vec<Trial>;

    /// Results whose participant belongs to `trial`, in stored order.
    fn list_results_for_trial(&self, trial: &Trial) -> Vec<ResultRecord>;

    fn lookup_variety(&self, variety_id: &VarietyId) -> Option<VarietyMetadata>;

    /// Region (oblast) label for a site, if the geography is known.
    fn lookup_region_for_site(&self, site_id: &SiteId) -> Option<String>;

    fn lookup_site_name(&self, site_id: &SiteId) -> Option<String>;

    fn get_trial(&self, trial_id: &TrialId) -> Option<Trial> {
        self.list_trials()
            .into_iter()
            .find(|trial| &trial.id == trial_id)
    }
}

impl<S: TrialStore + ?Sized> TrialStore for &S {
    fn list_trials(&self) -> Vec<Trial> {
        (**self).list_trials()
    }

    fn list_results_for_trial(&self, trial: &Trial) -> Vec<ResultRecord> {
        (**self).list_results_for_trial(trial)
    }

    fn lookup_variety(&self, variety_id: &VarietyId) -> Option<VarietyMetadata> {
        (**self).lookup_variety(variety_id)
    }

    fn lookup_region_for_site(&self, site_id: &SiteId) -> Option<String> {
        (**self).lookup_region_for_site(site_id)
    }

    fn lookup_site_name(&self, site_id: &SiteId) -> Option<String> {
        (**self).lookup_site_name(site_id)
    }

    fn get_trial(&self, trial_id: &TrialId) -> Option<Trial> {
        (**self).get_trial(trial_id)
    }
}
