//! Boundary checks for raw entered values against an indicator schema.

use std::collections::BTreeMap;

use vts_model::{
    IndicatorKey, IssueSeverity, ParticipantId, Trial, ValidationReport, ValueIssue, ValuesMap,
    parse_decimal,
};

use crate::definition::IndicatorSchema;

/// Checks one participant's raw values.
///
/// Errors: unparseable or out-of-range numbers, and values typed into computed
/// indicators. Warnings: unknown keys and missing required inputs.
pub fn validate_values(
    schema: &IndicatorSchema,
    participant_id: &ParticipantId,
    values: &BTreeMap<IndicatorKey, String>,
) -> Vec<ValueIssue> {
    let issue = |key: &str, severity: IssueSeverity, message: String| ValueIssue {
        participant_id: participant_id.clone(),
        key: key.to_string(),
        message,
        severity,
    };
    let mut issues = Vec::new();

    for (key, raw) in values {
        let key = key.as_str();
        let Some(def) = schema.definition(key) else {
            issues.push(issue(
                key,
                IssueSeverity::Warning,
                format!("unknown indicator for culture {}", schema.culture_id),
            ));
            continue;
        };
        if raw.trim().is_empty() {
            continue;
        }
        if !def.is_input() {
            issues.push(issue(
                key,
                IssueSeverity::Error,
                "computed indicator cannot hold an entered value".to_string(),
            ));
            continue;
        }
        let Some(number) = parse_decimal(raw) else {
            issues.push(issue(
                key,
                IssueSeverity::Error,
                format!("{raw:?} is not a number"),
            ));
            continue;
        };
        if let Some(min) = def.min
            && number < min
        {
            issues.push(issue(
                key,
                IssueSeverity::Error,
                format!("value {number} is below minimum {min}"),
            ));
        }
        if let Some(max) = def.max
            && number > max
        {
            issues.push(issue(
                key,
                IssueSeverity::Error,
                format!("value {number} is above maximum {max}"),
            ));
        }
    }

    for def in schema.indicators().filter(|def| def.is_input() && def.required) {
        let present = values
            .get(def.key)
            .is_some_and(|raw| !raw.trim().is_empty());
        if !present {
            issues.push(issue(
                def.key,
                IssueSeverity::Warning,
                "required value is missing".to_string(),
            ));
        }
    }

    issues
}

/// Checks every participant of `trial`, plus any values addressed to unknown participants.
pub fn validate_trial_values(
    schema: &IndicatorSchema,
    trial: &Trial,
    values: &ValuesMap,
) -> ValidationReport {
    let empty = BTreeMap::new();
    let mut issues = Vec::new();
    for participant in &trial.participants {
        let participant_values = values.get(&participant.id).unwrap_or(&empty);
        issues.extend(validate_values(schema, &participant.id, participant_values));
    }
    for participant_id in values.keys() {
        if trial.participant(participant_id).is_none() {
            issues.push(ValueIssue {
                participant_id: participant_id.clone(),
                key: String::new(),
                message: format!("participant is not part of trial {}", trial.id),
                severity: IssueSeverity::Error,
            });
        }
    }
    ValidationReport {
        trial_id: trial.id.to_string(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use crate::registry::get_indicator_schema;
    use vts_model::CultureId;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<IndicatorKey, String> {
        pairs
            .iter()
            .map(|(key, value)| (IndicatorKey::new(*key).unwrap(), value.to_string()))
            .collect()
    }

    fn complete_wheat_entry() -> Vec<(&'static str, &'static str)> {
        vec![
            ("yield_plot1", "31,0"),
            ("yield_plot2", "31.5"),
            ("yield_plot3", "31.2"),
            ("yield_plot4", "31.3"),
            ("vegetation_period", "88"),
        ]
    }

    #[test]
    fn complete_entry_is_clean() {
        let schema = get_indicator_schema(&CultureId::new("wheat").unwrap());
        let pid = ParticipantId::new("p-1").unwrap();
        let issues = validate_values(&schema, &pid, &values(&complete_wheat_entry()));
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn flags_bad_numbers_ranges_and_computed_keys() {
        let schema = get_indicator_schema(&CultureId::new("wheat").unwrap());
        let pid = ParticipantId::new("p-1").unwrap();
        let mut entry = complete_wheat_entry();
        entry[0] = ("yield_plot1", "abc");
        entry[1] = ("yield_plot2", "250");
        entry.push((keys::YIELD_AVG, "31.2"));
        entry.push(("smut", "0"));
        let issues = validate_values(&schema, &pid, &values(&entry));

        let errors: Vec<_> = issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Error)
            .map(|issue| issue.key.as_str())
            .collect();
        assert_eq!(errors, vec!["smut", "yield_avg", "yield_plot1", "yield_plot2"]);
    }

    #[test]
    fn warns_on_unknown_and_missing_required() {
        let schema = get_indicator_schema(&CultureId::new("wheat").unwrap());
        let pid = ParticipantId::new("p-1").unwrap();
        let issues = validate_values(
            &schema,
            &pid,
            &values(&[("yield_plot1", "30"), ("mystery", "1"), ("yield_plot2", " ")]),
        );
        assert!(issues.iter().all(|issue| issue.severity == IssueSeverity::Warning));
        let keys: Vec<_> = issues.iter().map(|issue| issue.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "mystery",
                "yield_plot2",
                "yield_plot3",
                "yield_plot4",
                "vegetation_period"
            ]
        );
    }
}
