use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{CultureId, IndicatorKey, ParticipantId, SiteId, TrialId, VarietyId};

/// Raw values entered for a trial: participant -> indicator -> decimal string.
pub type ValuesMap = BTreeMap<ParticipantId, BTreeMap<IndicatorKey, String>>;

/// A single variety's presence within one trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub trial_id: TrialId,
    pub variety_id: VarietyId,
    pub variety_name: String,
    pub is_standard: bool,
}

/// A field experiment at one site in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    pub id: TrialId,
    pub year: i32,
    pub culture_id: CultureId,
    pub location_id: SiteId,
    /// Crop grown on the field the previous season.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_type: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Trial {
    /// First participant flagged as standard.
    pub fn standard(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.is_standard)
    }

    pub fn standard_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_standard).count()
    }

    /// Returns the single standard, or an error when the trial has none or several.
    pub fn require_single_standard(&self) -> Result<&Participant> {
        match self.standard_count() {
            0 => Err(ModelError::MissingStandard {
                trial: self.id.to_string(),
            }),
            1 => self.standard().ok_or_else(|| ModelError::MissingStandard {
                trial: self.id.to_string(),
            }),
            count => Err(ModelError::MultipleStandards {
                trial: self.id.to_string(),
                count,
            }),
        }
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn participant_for_variety(&self, variety_id: &VarietyId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.variety_id == variety_id)
    }

    pub fn participant_ids(&self) -> BTreeSet<&ParticipantId> {
        self.participants.iter().map(|p| &p.id).collect()
    }
}

/// One stored measurement. Duplicate (participant, key) pairs resolve last-write-wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub participant_id: ParticipantId,
    #[serde(rename = "key")]
    pub indicator_key: IndicatorKey,
    #[serde(rename = "value")]
    pub raw_value: String,
}

impl ResultRecord {
    pub fn new(
        participant_id: ParticipantId,
        indicator_key: IndicatorKey,
        raw_value: impl Into<String>,
    ) -> Self {
        Self {
            participant_id,
            indicator_key,
            raw_value: raw_value.into(),
        }
    }
}

/// Input for creating a trial. The standard must be one of the listed varieties.
#[derive(Debug, Clone)]
pub struct TrialDraft {
    pub id: Option<TrialId>,
    pub year: i32,
    pub culture_id: CultureId,
    pub location_id: SiteId,
    pub participant_variety_ids: Vec<VarietyId>,
    pub standard_variety_id: VarietyId,
    pub predecessor: Option<String>,
    pub trial_type: Option<String>,
}

impl TrialDraft {
    /// Builds the trial, naming participants through `variety_name`.
    ///
    /// Exactly one participant ends up flagged as standard; this is the only
    /// place the invariant is established.
    pub fn build<F>(self, mut variety_name: F) -> Result<Trial>
    where
        F: FnMut(&VarietyId) -> Option<String>,
    {
        if self.participant_variety_ids.is_empty() {
            return Err(ModelError::NoParticipants);
        }
        let mut seen = BTreeSet::new();
        for variety in &self.participant_variety_ids {
            if !seen.insert(variety) {
                return Err(ModelError::DuplicateParticipant {
                    variety: variety.to_string(),
                });
            }
        }
        if !seen.contains(&self.standard_variety_id) {
            return Err(ModelError::StandardNotParticipant {
                variety: self.standard_variety_id.to_string(),
            });
        }

        let id = self.id.unwrap_or_else(TrialId::generate);
        let participants = self
            .participant_variety_ids
            .into_iter()
            .map(|variety_id| Participant {
                id: ParticipantId::generate(),
                trial_id: id.clone(),
                variety_name: variety_name(&variety_id)
                    .unwrap_or_else(|| format!("Variety {variety_id}")),
                is_standard: variety_id == self.standard_variety_id,
                variety_id,
            })
            .collect();

        Ok(Trial {
            id,
            year: self.year,
            culture_id: self.culture_id,
            location_id: self.location_id,
            predecessor: self.predecessor,
            trial_type: self.trial_type,
            participants,
        })
    }
}
