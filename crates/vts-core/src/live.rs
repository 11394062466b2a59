//! Per-screen computation while plot yields are being entered.
//!
//! Recomputed from scratch on every call. Anything that depends on an
//! incomplete plot set stays `None`; nothing is ever zero-filled.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;
use vts_indicators::keys;
use vts_model::{ParticipantId, Trial, ValuesMap};

use crate::resolver::ResolvedResults;
use crate::stats::{self, LsdParams};

/// Derived values for one participant, keyed like the schema's computed indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedIndicators {
    pub yield_avg: Option<f64>,
    pub yield_stddev: Option<f64>,
    pub yield_cv: Option<f64>,
    pub over_std_abs: Option<f64>,
    pub over_std_pct: Option<f64>,
    pub lsd: Option<f64>,
    /// Whether |delta| is larger than the LSD.
    pub exceeds_lsd: Option<bool>,
}

impl ComputedIndicators {
    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            keys::YIELD_AVG => self.yield_avg,
            keys::YIELD_STDDEV => self.yield_stddev,
            keys::YIELD_CV => self.yield_cv,
            keys::OVER_STD_ABS => self.over_std_abs,
            keys::OVER_STD_PCT => self.over_std_pct,
            keys::LSD => self.lsd,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveComputation {
    pub standard_participant_id: Option<ParticipantId>,
    pub participants: BTreeMap<ParticipantId, ComputedIndicators>,
}

impl LiveComputation {
    pub fn for_participant(&self, participant: &ParticipantId) -> Option<&ComputedIndicators> {
        self.participants.get(participant)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveOptions {
    /// Participant selected as standard on screen; the flagged standard otherwise.
    pub standard_override: Option<ParticipantId>,
    pub lsd: LsdParams,
}

pub fn resolve_live_computation(trial: &Trial, values: &ValuesMap) -> LiveComputation {
    resolve_live_computation_with(trial, values, &LiveOptions::default())
}

pub fn resolve_live_computation_with(
    trial: &Trial,
    values: &ValuesMap,
    options: &LiveOptions,
) -> LiveComputation {
    let resolved = ResolvedResults::from_values(trial, values);

    let standard = match &options.standard_override {
        Some(id) if trial.participant(id).is_some() => Some(id.clone()),
        Some(id) => {
            warn!(trial = %trial.id, participant = %id, "standard override is not a participant");
            resolved.standard().map(|p| p.id.clone())
        }
        None => resolved.standard().map(|p| p.id.clone()),
    };

    let own = |participant: &ParticipantId| {
        let plots = resolved.plot_yields(participant);
        let mean = plots.and_then(|p| stats::mean(&p));
        let std_dev = plots.and_then(|p| stats::sample_std_dev(&p));
        (mean, std_dev)
    };
    let (standard_mean, standard_std_dev) = match &standard {
        Some(id) => own(id),
        None => (None, None),
    };

    let participants = trial
        .participants
        .iter()
        .map(|participant| {
            let (mean, std_dev) = own(&participant.id);
            let mut computed = ComputedIndicators {
                yield_avg: mean,
                yield_stddev: std_dev,
                yield_cv: stats::coefficient_of_variation(mean, std_dev),
                ..ComputedIndicators::default()
            };
            if standard.as_ref() != Some(&participant.id) {
                computed.over_std_abs = stats::absolute_delta(mean, standard_mean);
                computed.over_std_pct = stats::standard_relative_delta(mean, standard_mean);
                computed.lsd = stats::least_significant_difference(standard_std_dev, options.lsd);
                computed.exceeds_lsd = computed
                    .over_std_abs
                    .zip(computed.lsd)
                    .map(|(delta, lsd)| delta.abs() > lsd);
            }
            (participant.id.clone(), computed)
        })
        .collect();

    LiveComputation {
        standard_participant_id: standard,
        participants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vts_model::{CultureId, IndicatorKey, Participant, SiteId, TrialId, VarietyId};

    fn trial() -> Trial {
        let id = TrialId::new("t-live").unwrap();
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
            participants: vec![
                participant("std", true),
                participant("cand", false),
                participant("late", false),
            ],
        }
    }

    fn plots(values: &mut ValuesMap, pid: &str, plots: &[&str]) {
        let entries = values.entry(ParticipantId::new(pid).unwrap()).or_default();
        for (index, value) in plots.iter().enumerate() {
            entries.insert(
                IndicatorKey::new(format!("yield_plot{}", index + 1)).unwrap(),
                value.to_string(),
            );
        }
    }

    #[test]
    fn deltas_against_flagged_standard() {
        let trial = trial();
        let mut values = ValuesMap::new();
        plots(&mut values, "std", &["31.0", "31.5", "31.2", "31.3"]);
        plots(&mut values, "cand", &["32,4", "32,8", "33,0", "32,5"]);
        plots(&mut values, "late", &["30", "30", ""]);

        let live = resolve_live_computation(&trial, &values);
        assert_eq!(live.standard_participant_id.as_ref().map(|p| p.as_str()), Some("std"));

        let standard = live.for_participant(&ParticipantId::new("std").unwrap()).unwrap();
        assert_relative_eq!(standard.yield_avg.unwrap(), 31.25, epsilon = 1e-9);
        assert_eq!(standard.over_std_abs, None);
        assert_eq!(standard.lsd, None);

        let cand = live.for_participant(&ParticipantId::new("cand").unwrap()).unwrap();
        assert_relative_eq!(cand.yield_avg.unwrap(), 32.675, epsilon = 1e-9);
        assert_relative_eq!(cand.over_std_abs.unwrap(), 1.425, epsilon = 1e-9);
        assert_relative_eq!(cand.over_std_pct.unwrap(), 4.56, epsilon = 1e-9);
        assert_relative_eq!(cand.get(keys::YIELD_AVG).unwrap(), 32.675, epsilon = 1e-9);
        assert!(cand.yield_cv.is_some());
        assert_eq!(cand.exceeds_lsd, Some(true));

        let late = live.for_participant(&ParticipantId::new("late").unwrap()).unwrap();
        assert_eq!(late.yield_avg, None);
        assert_eq!(late.over_std_abs, None);
        assert_eq!(late.over_std_pct, None);
        // LSD depends only on the standard's spread.
        assert!(late.lsd.is_some());
        assert_eq!(late.exceeds_lsd, None);
    }

    #[test]
    fn override_switches_the_reference() {
        let trial = trial();
        let mut values = ValuesMap::new();
        plots(&mut values, "std", &["30", "30", "30", "30"]);
        plots(&mut values, "cand", &["33", "33", "33", "33"]);

        let options = LiveOptions {
            standard_override: Some(ParticipantId::new("cand").unwrap()),
            ..LiveOptions::default()
        };
        let live = resolve_live_computation_with(&trial, &values, &options);
        let std = live.for_participant(&ParticipantId::new("std").unwrap()).unwrap();
        assert_relative_eq!(std.over_std_abs.unwrap(), -3.0, epsilon = 1e-9);
        // Zero spread gives a zero LSD, and any difference exceeds it.
        assert_eq!(std.lsd, Some(0.0));
        assert_eq!(std.exceeds_lsd, Some(true));
    }

    #[test]
    fn unknown_override_falls_back_to_flagged_standard() {
        let trial = trial();
        let options = LiveOptions {
            standard_override: Some(ParticipantId::new("nobody").unwrap()),
            ..LiveOptions::default()
        };
        let live = resolve_live_computation_with(&trial, &ValuesMap::new(), &options);
        assert_eq!(live.standard_participant_id.as_ref().map(|p| p.as_str()), Some("std"));
        assert!(live.participants.values().all(|c| c.yield_avg.is_none()));
    }
}
