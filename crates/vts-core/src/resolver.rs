//! Groups a trial's flat result records into per-participant value maps.

use std::collections::BTreeMap;

use tracing::debug;
use vts_indicators::keys::PLOT_YIELD_KEYS;
use vts_model::{
    IndicatorKey, Participant, ParticipantId, ResultRecord, Trial, ValuesMap, parse_decimal,
};

use crate::stats;

/// Raw values of one trial keyed by participant, with typed accessors.
#[derive(Debug, Clone)]
pub struct ResolvedResults<'a> {
    trial: &'a Trial,
    values: ValuesMap,
    orphaned: usize,
}

impl<'a> ResolvedResults<'a> {
    /// Groups `records` by participant. Later records for the same key win;
    /// records of participants outside the trial are dropped.
    pub fn resolve(trial: &'a Trial, records: &[ResultRecord]) -> Self {
        let participants = trial.participant_ids();
        let mut values = ValuesMap::new();
        let mut orphaned = 0;
        for record in records {
            if !participants.contains(&record.participant_id) {
                orphaned += 1;
                continue;
            }
            values
                .entry(record.participant_id.clone())
                .or_default()
                .insert(record.indicator_key.clone(), record.raw_value.clone());
        }
        if orphaned > 0 {
            debug!(trial = %trial.id, orphaned, "ignoring results of unknown participants");
        }
        Self {
            trial,
            values,
            orphaned,
        }
    }

    /// Wraps values as entered on screen, dropping participants outside the trial.
    pub fn from_values(trial: &'a Trial, values: &ValuesMap) -> Self {
        let participants = trial.participant_ids();
        let mut kept = ValuesMap::new();
        let mut orphaned = 0;
        for (participant, entries) in values {
            if participants.contains(participant) {
                kept.insert(participant.clone(), entries.clone());
            } else {
                orphaned += entries.len();
            }
        }
        if orphaned > 0 {
            debug!(trial = %trial.id, orphaned, "ignoring values of unknown participants");
        }
        Self {
            trial,
            values: kept,
            orphaned,
        }
    }

    pub fn trial(&self) -> &'a Trial {
        self.trial
    }

    /// First participant flagged as standard.
    pub fn standard(&self) -> Option<&'a Participant> {
        self.trial.standard()
    }

    /// Entry-screen view of the resolved values.
    pub fn values(&self) -> &ValuesMap {
        &self.values
    }

    pub fn values_for(
        &self,
        participant: &ParticipantId,
    ) -> Option<&BTreeMap<IndicatorKey, String>> {
        self.values.get(participant)
    }

    pub fn raw(&self, participant: &ParticipantId, key: &str) -> Option<&str> {
        self.values
            .get(participant)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Parsed value; blank or malformed input is absent.
    pub fn number(&self, participant: &ParticipantId, key: &str) -> Option<f64> {
        self.raw(participant, key).and_then(parse_decimal)
    }

    /// All four plot yields, or `None` if any is missing or malformed.
    pub fn plot_yields(&self, participant: &ParticipantId) -> Option<[f64; 4]> {
        let mut plots = [0.0; 4];
        for (slot, key) in plots.iter_mut().zip(PLOT_YIELD_KEYS) {
            *slot = self.number(participant, key)?;
        }
        Some(plots)
    }

    /// Mean of the full plot set.
    pub fn plot_mean(&self, participant: &ParticipantId) -> Option<f64> {
        self.plot_yields(participant).and_then(|plots| stats::mean(&plots))
    }

    pub fn orphaned_records(&self) -> usize {
        self.orphaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vts_model::{CultureId, SiteId, TrialId, VarietyId};

    fn trial() -> Trial {
        let id = TrialId::new("t-1").unwrap();
        let participant = |pid: &str, standard: bool| Participant {
            id: ParticipantId::new(pid).unwrap(),
            trial_id: id.clone(),
            variety_id: VarietyId::new(format!("var-{pid}")).unwrap(),
            variety_name: pid.to_string(),
            is_standard: standard,
        };
        Trial {
            id: id.clone(),
            year: 2024,
            culture_id: CultureId::new("wheat").unwrap(),
            location_id: SiteId::new("site").unwrap(),
            predecessor: None,
            trial_type: None,
            participants: vec![participant("a", true), participant("b", false)],
        }
    }

    fn record(pid: &str, key: &str, value: &str) -> ResultRecord {
        ResultRecord::new(
            ParticipantId::new(pid).unwrap(),
            IndicatorKey::new(key).unwrap(),
            value,
        )
    }

    #[test]
    fn last_write_wins_and_orphans_are_counted() {
        let trial = trial();
        let records = vec![
            record("a", "smut", "1"),
            record("a", "smut", "2,5"),
            record("zzz", "smut", "4"),
        ];
        let resolved = ResolvedResults::resolve(&trial, &records);
        let a = ParticipantId::new("a").unwrap();
        assert_eq!(resolved.raw(&a, "smut"), Some("2,5"));
        assert_eq!(resolved.number(&a, "smut"), Some(2.5));
        assert_eq!(resolved.orphaned_records(), 1);
        assert_eq!(resolved.standard().map(|p| p.id.as_str()), Some("a"));
    }

    #[test]
    fn plot_yields_need_all_four() {
        let trial = trial();
        let mut records: Vec<_> = PLOT_YIELD_KEYS
            .iter()
            .map(|key| record("a", key, "30"))
            .collect();
        records.extend(PLOT_YIELD_KEYS[..3].iter().map(|key| record("b", key, "30")));
        records.push(record("b", "yield_plot4", "n/a"));

        let resolved = ResolvedResults::resolve(&trial, &records);
        assert_eq!(
            resolved.plot_yields(&ParticipantId::new("a").unwrap()),
            Some([30.0; 4])
        );
        assert_eq!(resolved.plot_mean(&ParticipantId::new("a").unwrap()), Some(30.0));
        assert_eq!(resolved.plot_yields(&ParticipantId::new("b").unwrap()), None);
    }

    #[test]
    fn screen_values_drop_foreign_participants() {
        let trial = trial();
        let mut values = ValuesMap::new();
        let mut entries = BTreeMap::new();
        entries.insert(IndicatorKey::new("smut").unwrap(), "1".to_string());
        values.insert(ParticipantId::new("b").unwrap(), entries.clone());
        values.insert(ParticipantId::new("ghost").unwrap(), entries);

        let resolved = ResolvedResults::from_values(&trial, &values);
        assert!(resolved.values_for(&ParticipantId::new("ghost").unwrap()).is_none());
        assert_eq!(resolved.number(&ParticipantId::new("b").unwrap(), "smut"), Some(1.0));
        assert_eq!(resolved.orphaned_records(), 1);
    }
}
