//! Integration tests for the in-memory store and its JSON snapshot.

use std::collections::BTreeMap;

use vts_model::{
    CultureId, IndicatorKey, OutcomeRow, ParticipantId, SiteId, TrialDraft, TrialId, ValuesMap,
    VarietyId, VarietyStatus, YearOutcome,
};
use vts_store::{
    MemoryStore, SiteCatalog, Snapshot, StoreError, TrialStore, open_store, save_store,
    seed_snapshot,
};

fn seeded() -> MemoryStore {
    MemoryStore::from_snapshot(seed_snapshot().unwrap(), SiteCatalog::bundled().unwrap()).unwrap()
}

fn entry(pairs: &[(&str, &str)]) -> BTreeMap<IndicatorKey, String> {
    pairs
        .iter()
        .map(|(key, value)| (IndicatorKey::new(*key).unwrap(), value.to_string()))
        .collect()
}

#[test]
fn results_are_scoped_to_the_trial() {
    let store = seeded();
    let trials = store.list_trials();
    assert_eq!(trials.len(), 1);
    let results = store.list_results_for_trial(&trials[0]);
    assert_eq!(results.len(), 8);
    assert_eq!(results[0].participant_id.as_str(), "p-std-001");
    assert_eq!(results[0].indicator_key.as_str(), "yield_plot1");
}

#[test]
fn lookups_resolve_geography_and_varieties() {
    let store = seeded();
    let site = SiteId::new("kostanay-fedorov-gsu").unwrap();
    assert_eq!(
        store.lookup_region_for_site(&site).as_deref(),
        Some("Костанайская область")
    );
    assert_eq!(store.lookup_site_name(&site).as_deref(), Some("Федоровский ГСУ"));
    assert_eq!(
        store.lookup_region_for_site(&SiteId::new("nowhere").unwrap()),
        None
    );
    let variety = store
        .lookup_variety(&VarietyId::new("var-001").unwrap())
        .unwrap();
    assert_eq!(variety.maturity_group.as_deref(), Some("D1 — mid-early"));
}

#[test]
fn snapshot_survives_save_and_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");
    let store = seeded();
    save_store(&store, &path).unwrap();

    let reopened = open_store(&path, SiteCatalog::bundled().unwrap()).unwrap();
    assert_eq!(reopened.to_snapshot(), store.to_snapshot());
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn snapshot_rejects_duplicate_trial_ids() {
    let mut snapshot = seed_snapshot().unwrap();
    snapshot.trials.push(snapshot.trials[0].clone());
    let err = MemoryStore::from_snapshot(snapshot, SiteCatalog::default()).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateTrial { .. }));
}

#[test]
fn empty_json_object_is_an_empty_snapshot() {
    let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
    assert_eq!(snapshot, Snapshot::default());
}

#[test]
fn create_trial_names_participants_from_registry() {
    let mut store = seeded();
    let trial = store
        .create_trial(TrialDraft {
            id: Some(TrialId::new("trial-002").unwrap()),
            year: 2025,
            culture_id: CultureId::new("wheat").unwrap(),
            location_id: SiteId::new("akmola-shortandy-gsu").unwrap(),
            participant_variety_ids: vec![
                VarietyId::new("var-std").unwrap(),
                VarietyId::new("var-xyz").unwrap(),
            ],
            standard_variety_id: VarietyId::new("var-std").unwrap(),
            predecessor: Some("fallow".to_string()),
            trial_type: None,
        })
        .unwrap();

    assert_eq!(trial.participants[0].variety_name, "Astana Standard");
    assert_eq!(trial.participants[1].variety_name, "Variety var-xyz");
    assert_eq!(store.list_trials().len(), 2);
}

#[test]
fn create_trial_refuses_existing_id() {
    let mut store = seeded();
    let err = store
        .create_trial(TrialDraft {
            id: Some(TrialId::new("trial-001").unwrap()),
            year: 2025,
            culture_id: CultureId::new("wheat").unwrap(),
            location_id: SiteId::new("akmola-shortandy-gsu").unwrap(),
            participant_variety_ids: vec![VarietyId::new("var-std").unwrap()],
            standard_variety_id: VarietyId::new("var-std").unwrap(),
            predecessor: None,
            trial_type: None,
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateTrial { .. }));
}

#[test]
fn save_results_replaces_previous_values() {
    let mut store = seeded();
    let trial_id = TrialId::new("trial-001").unwrap();
    let mut values = ValuesMap::new();
    values.insert(
        ParticipantId::new("p-var-001").unwrap(),
        entry(&[("yield_plot1", "40,0"), ("smut", "2")]),
    );

    let written = store.save_results(&trial_id, &values).unwrap();
    assert_eq!(written, 2);

    let trial = store.get_trial(&trial_id).unwrap();
    let results = store.list_results_for_trial(&trial);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.participant_id.as_str() == "p-var-001"));
}

#[test]
fn save_results_rejects_foreign_participants() {
    let mut store = seeded();
    let mut values = ValuesMap::new();
    values.insert(ParticipantId::new("p-other").unwrap(), entry(&[]));
    let err = store
        .save_results(&TrialId::new("trial-001").unwrap(), &values)
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownParticipant { .. }));

    let err = store
        .save_results(&TrialId::new("missing").unwrap(), &ValuesMap::new())
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownTrial { .. }));
}

#[test]
fn recorded_outcomes_persist_on_the_variety() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let mut store = seeded();
    let variety_id = VarietyId::new("var-001").unwrap();
    let outcome = |summary: &str| YearOutcome {
        year: 2024,
        summary: summary.to_string(),
        rows: vec![OutcomeRow {
            indicator: "Yield, c/ha".to_string(),
            variety_value: "32.67".to_string(),
            standard_value: "31.25".to_string(),
            deviation: "+1.43".to_string(),
            is_positive: true,
        }],
    };

    assert!(store.record_outcome(
        &variety_id,
        "Костанайская область",
        outcome("Excess over standard: +2.0%"),
        VarietyStatus::Extended,
    ));
    assert!(store.record_outcome(
        &variety_id,
        "Костанайская область",
        outcome("Excess over standard: +4.6%"),
        VarietyStatus::Extended,
    ));
    assert!(!store.record_outcome(
        &VarietyId::new("var-unknown").unwrap(),
        "Костанайская область",
        outcome("Excess over standard: n/a"),
        VarietyStatus::Extended,
    ));
    save_store(&store, &path).unwrap();

    let reopened = open_store(&path, SiteCatalog::bundled().unwrap()).unwrap();
    let variety = reopened.lookup_variety(&variety_id).unwrap();
    assert_eq!(variety.status, Some(VarietyStatus::Extended));
    assert_eq!(variety.results.len(), 1);
    let year = variety.year_outcome("Костанайская область", 2024).unwrap();
    assert_eq!(year.summary, "Excess over standard: +4.6%");
    assert_eq!(year.rows[0].deviation, "+1.43");

    let standard = reopened
        .lookup_variety(&VarietyId::new("var-std").unwrap())
        .unwrap();
    assert_eq!(standard.status, None);
    assert!(standard.results.is_empty());
}
