use tracing::debug;
use vts_model::CultureId;

use crate::definition::{IndicatorDef, IndicatorGroup, IndicatorSchema};
use crate::keys;

/// Cultures known to the registry, with display labels.
pub const CULTURES: &[(&str, &str)] = &[
    ("wheat", "Soft wheat"),
    ("barley", "Barley"),
    ("potato", "Potato"),
    ("sunflower", "Sunflower"),
    ("sugar_beet", "Sugar beet"),
    ("apricot", "Apricot"),
    ("quince", "Quince"),
    ("cherry_plum", "Cherry plum"),
];

pub fn culture_label(culture_id: &str) -> Option<&'static str> {
    CULTURES
        .iter()
        .find(|(id, _)| *id == culture_id)
        .map(|(_, label)| *label)
}

/// Returns the ordered indicator groups for `culture_id`.
///
/// Cultures without a dedicated schema get the default set (yield,
/// vegetation period, plant height); this never fails.
pub fn get_indicator_schema(culture_id: &CultureId) -> IndicatorSchema {
    let groups = match culture_id.as_str() {
        "wheat" => cereal_groups(true),
        "barley" => cereal_groups(false),
        _ => Vec::new(),
    };
    let fallback = groups.is_empty();
    if fallback {
        debug!(culture = %culture_id, "no dedicated indicator schema, using default set");
    }
    IndicatorSchema {
        culture_id: culture_id.clone(),
        culture_label: culture_label(culture_id.as_str()),
        fallback,
        groups: if fallback { default_groups() } else { groups },
    }
}

fn plot_inputs() -> Vec<IndicatorDef> {
    const LABELS: [&str; 4] = ["Plot 1 yield", "Plot 2 yield", "Plot 3 yield", "Plot 4 yield"];
    keys::PLOT_YIELD_KEYS
        .into_iter()
        .zip(LABELS)
        .map(|(key, label)| {
            IndicatorDef::input(key, label, "c/ha", "yield")
                .required()
                .range(0.0, 200.0, 0.1)
        })
        .collect()
}

fn yield_statistics() -> Vec<IndicatorDef> {
    vec![
        IndicatorDef::computed(keys::YIELD_AVG, "Yield", "c/ha", "yield"),
        IndicatorDef::computed(keys::YIELD_STDDEV, "Yield standard deviation", "c/ha", "yield"),
        IndicatorDef::computed(keys::YIELD_CV, "Coefficient of variation", "%", "yield"),
        IndicatorDef::computed(keys::OVER_STD_ABS, "Excess over standard", "c/ha", "yield"),
        IndicatorDef::computed(keys::OVER_STD_PCT, "Excess over standard", "%", "yield"),
        IndicatorDef::computed(keys::LSD, "Least significant difference", "c/ha", "yield"),
    ]
}

fn score(key: &'static str, label: &'static str, group: &'static str) -> IndicatorDef {
    IndicatorDef::input(key, label, "points", group).range(1.0, 9.0, 1.0)
}

fn cereal_groups(with_baking: bool) -> Vec<IndicatorGroup> {
    let mut yield_group = plot_inputs();
    yield_group.extend(yield_statistics());
    yield_group.push(
        IndicatorDef::input(keys::THOUSAND_GRAIN_WEIGHT, "Thousand-grain weight", "g", "yield")
            .range(10.0, 70.0, 0.1),
    );
    yield_group.push(
        IndicatorDef::input(keys::GRAIN_NATURE, "Grain test weight", "g/l", "yield")
            .range(500.0, 900.0, 1.0),
    );

    let mut quality = vec![
        IndicatorDef::input(keys::PROTEIN_CONTENT, "Protein content", "%", "quality")
            .range(5.0, 25.0, 0.1),
        IndicatorDef::input(keys::RAW_GLUTEN, "Raw gluten content", "%", "quality")
            .range(10.0, 50.0, 0.1),
        IndicatorDef::input(keys::GLASSINESS, "Vitreousness", "%", "quality")
            .range(0.0, 100.0, 1.0),
    ];
    if with_baking {
        quality.push(
            IndicatorDef::input(keys::BREAD_VOLUME, "Loaf volume", "cm³", "quality")
                .range(200.0, 1500.0, 10.0),
        );
        quality.push(score(keys::BAKING_SCORE, "Overall baking score", "quality"));
    }

    vec![
        IndicatorGroup {
            name: "1. Yield & structure",
            indicators: yield_group,
        },
        IndicatorGroup {
            name: "2. Vegetation",
            indicators: vec![
                IndicatorDef::input(keys::VEGETATION_PERIOD, "Vegetation period", "days", "veg")
                    .required()
                    .range(30.0, 200.0, 1.0),
                IndicatorDef::input(keys::PLANT_HEIGHT, "Plant height", "cm", "veg")
                    .range(20.0, 200.0, 1.0),
                IndicatorDef::input(keys::PREHARVEST_MOISTURE, "Pre-harvest moisture", "%", "veg")
                    .range(5.0, 40.0, 0.1),
            ],
        },
        IndicatorGroup {
            name: "3. Resistance (points)",
            indicators: vec![
                score(keys::LODGING_RESISTANCE, "Lodging resistance", "res"),
                score(keys::SHATTERING_RESISTANCE, "Shattering resistance", "res"),
                score(keys::DROUGHT_RESISTANCE, "Drought resistance", "res"),
            ],
        },
        IndicatorGroup {
            name: "4. Quality",
            indicators: quality,
        },
        IndicatorGroup {
            name: "5. Disease",
            indicators: vec![
                score(keys::SMUT, "Loose smut", "disease"),
                score(keys::STEM_RUST, "Stem rust", "disease"),
                score(keys::EAR_SEPTORIA, "Ear septoria", "disease"),
            ],
        },
        IndicatorGroup {
            name: "6. Final assessment",
            indicators: vec![score(keys::FINAL_SCORE, "Overall variety score", "final")],
        },
    ]
}

fn default_groups() -> Vec<IndicatorGroup> {
    let mut yield_group = plot_inputs();
    yield_group.extend(yield_statistics());
    vec![
        IndicatorGroup {
            name: "1. Yield",
            indicators: yield_group,
        },
        IndicatorGroup {
            name: "2. Main indicators",
            indicators: vec![
                IndicatorDef::input(keys::VEGETATION_PERIOD, "Vegetation period", "days", "main")
                    .range(30.0, 365.0, 1.0),
                IndicatorDef::input(keys::PLANT_HEIGHT, "Plant height", "cm", "main")
                    .range(1.0, 1000.0, 1.0),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::IndicatorKind;

    fn culture(id: &str) -> CultureId {
        CultureId::new(id).unwrap()
    }

    #[test]
    fn wheat_has_full_group_list() {
        let schema = get_indicator_schema(&culture("wheat"));
        assert!(!schema.fallback);
        assert_eq!(schema.culture_label, Some("Soft wheat"));
        let names: Vec<_> = schema.groups.iter().map(|g| g.name).collect();
        assert_eq!(
            names,
            vec![
                "1. Yield & structure",
                "2. Vegetation",
                "3. Resistance (points)",
                "4. Quality",
                "5. Disease",
                "6. Final assessment",
            ]
        );
        assert!(schema.definition(keys::BREAD_VOLUME).is_some());
    }

    #[test]
    fn barley_skips_baking_quality() {
        let schema = get_indicator_schema(&culture("barley"));
        assert!(schema.definition(keys::PROTEIN_CONTENT).is_some());
        assert!(schema.definition(keys::BREAD_VOLUME).is_none());
        assert!(schema.definition(keys::BAKING_SCORE).is_none());
    }

    #[test]
    fn unknown_culture_falls_back_to_default_set() {
        let schema = get_indicator_schema(&culture("rice"));
        assert!(schema.fallback);
        assert_eq!(schema.culture_label, None);
        assert!(schema.definition(keys::YIELD_AVG).is_some());
        assert!(schema.definition(keys::VEGETATION_PERIOD).is_some());
        assert!(schema.definition(keys::PLANT_HEIGHT).is_some());
        assert!(schema.definition(keys::SMUT).is_none());
    }

    #[test]
    fn plot_yields_are_required_inputs_and_statistics_are_computed() {
        let schema = get_indicator_schema(&culture("potato"));
        for key in keys::PLOT_YIELD_KEYS {
            let def = schema.definition(key).unwrap();
            assert_eq!(def.kind, IndicatorKind::Input);
            assert!(def.required);
            assert_eq!(def.max, Some(200.0));
        }
        assert_eq!(
            schema.computed_keys(),
            vec![
                keys::YIELD_AVG,
                keys::YIELD_STDDEV,
                keys::YIELD_CV,
                keys::OVER_STD_ABS,
                keys::OVER_STD_PCT,
                keys::LSD,
            ]
        );
    }
}
