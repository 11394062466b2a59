use serde::Serialize;
use vts_model::CultureId;

/// Whether an indicator is typed in by the user or derived from sibling inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Input,
    Computed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorDef {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    pub kind: IndicatorKind,
    /// Short code of the owning group, e.g. `yield` or `disease`.
    pub group: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl IndicatorDef {
    pub fn input(
        key: &'static str,
        label: &'static str,
        unit: &'static str,
        group: &'static str,
    ) -> Self {
        Self {
            key,
            label,
            unit: (!unit.is_empty()).then_some(unit),
            kind: IndicatorKind::Input,
            group,
            required: false,
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn computed(
        key: &'static str,
        label: &'static str,
        unit: &'static str,
        group: &'static str,
    ) -> Self {
        Self {
            kind: IndicatorKind::Computed,
            ..Self::input(key, label, unit, group)
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn range(mut self, min: f64, max: f64, step: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.step = Some(step);
        self
    }

    pub fn is_input(&self) -> bool {
        self.kind == IndicatorKind::Input
    }

    /// Label with unit suffix, as shown in entry tables.
    pub fn display_label(&self) -> String {
        match self.unit {
            Some(unit) => format!("{}, {unit}", self.label),
            None => self.label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorGroup {
    pub name: &'static str,
    pub indicators: Vec<IndicatorDef>,
}

/// Ordered indicator groups for one culture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSchema {
    pub culture_id: CultureId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culture_label: Option<&'static str>,
    /// True when the culture had no dedicated schema and the default set was used.
    pub fallback: bool,
    pub groups: Vec<IndicatorGroup>,
}

impl IndicatorSchema {
    pub fn indicators(&self) -> impl Iterator<Item = &IndicatorDef> {
        self.groups.iter().flat_map(|group| group.indicators.iter())
    }

    pub fn definition(&self, key: &str) -> Option<&IndicatorDef> {
        self.indicators().find(|def| def.key == key)
    }

    pub fn input_keys(&self) -> Vec<&'static str> {
        self.indicators()
            .filter(|def| def.is_input())
            .map(|def| def.key)
            .collect()
    }

    pub fn computed_keys(&self) -> Vec<&'static str> {
        self.indicators()
            .filter(|def| !def.is_input())
            .map(|def| def.key)
            .collect()
    }
}
