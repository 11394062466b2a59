//! Starter data for an empty store.

use vts_model::{
    CultureId, IndicatorKey, Participant, ParticipantId, ResultRecord, SiteId, Trial, TrialId,
    VarietyId, VarietyMetadata,
};

use crate::error::Result;
use crate::snapshot::Snapshot;

const MATURITY_MID_EARLY: &str = "D1 — mid-early";

fn variety(id: &str, name: &str) -> Result<VarietyMetadata> {
    Ok(VarietyMetadata {
        culture_id: Some(CultureId::new("wheat")?),
        maturity_group: Some(MATURITY_MID_EARLY.to_string()),
        ..VarietyMetadata::new(VarietyId::new(id)?, name)
    })
}

fn participant(
    id: &str,
    trial: &TrialId,
    variety: &VarietyMetadata,
    standard: bool,
) -> Result<Participant> {
    Ok(Participant {
        id: ParticipantId::new(id)?,
        trial_id: trial.clone(),
        variety_id: variety.id.clone(),
        variety_name: variety.name.clone(),
        is_standard: standard,
    })
}

fn plots(participant: &str, values: [&str; 4]) -> Result<Vec<ResultRecord>> {
    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        records.push(ResultRecord::new(
            ParticipantId::new(participant)?,
            IndicatorKey::new(format!("yield_plot{}", index + 1))?,
            value,
        ));
    }
    Ok(records)
}

/// One wheat trial at the Fedorov site: a standard and one candidate with full plot yields.
pub fn seed_snapshot() -> Result<Snapshot> {
    let standard = variety("var-std", "Astana Standard")?;
    let candidate = variety("var-001", "Lutescens 32")?;
    let trial_id = TrialId::new("trial-001")?;

    let trial = Trial {
        id: trial_id.clone(),
        year: 2024,
        culture_id: CultureId::new("wheat")?,
        location_id: SiteId::new("kostanay-fedorov-gsu")?,
        predecessor: None,
        trial_type: Some("competitive".to_string()),
        participants: vec![
            participant("p-std-001", &trial_id, &standard, true)?,
            participant("p-var-001", &trial_id, &candidate, false)?,
        ],
    };

    let mut results = plots("p-std-001", ["31.0", "31.5", "31.2", "31.3"])?;
    results.extend(plots("p-var-001", ["32.4", "32.8", "33.0", "32.5"])?);

    Ok(Snapshot {
        trials: vec![trial],
        results,
        varieties: vec![standard, candidate],
    })
}
