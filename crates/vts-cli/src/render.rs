//! Terminal tables and CSV/JSON output.

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use vts_core::{LiveComputation, VarietyOutcome, VarietyTrialEntry};
use vts_indicators::{IndicatorKind, IndicatorSchema};
use vts_model::{IssueSeverity, ReportGroup, ReportSite, ReportTree, Trial, ValidationReport};
use vts_store::SiteEntry;

/// Shown for absent numbers.
pub const MISSING: &str = "-";

pub fn format_value(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) => format!("{value:.decimals$}"),
        None => MISSING.to_string(),
    }
}

pub fn format_signed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) => format!("{value:+.decimals$}"),
        None => MISSING.to_string(),
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serialize JSON output")
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn number_cell(value: Option<f64>, decimals: usize) -> Cell {
    match value {
        Some(_) => Cell::new(format_value(value, decimals)),
        None => dim_cell(MISSING),
    }
}

fn delta_cell(value: Option<f64>, decimals: usize) -> Cell {
    match value {
        Some(v) if v > 0.0 => Cell::new(format_signed(value, decimals)).fg(Color::Green),
        Some(v) if v < 0.0 => Cell::new(format_signed(value, decimals)).fg(Color::Red),
        Some(_) => Cell::new(format_signed(value, decimals)),
        None => dim_cell(MISSING),
    }
}

fn align_right(table: &mut Table, from: usize) {
    for index in from..table.column_count() {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Row average minus the group's default standard average.
fn over_standard(group: &ReportGroup, average: Option<f64>) -> Option<f64> {
    let standard = group.default_standard()?.multi_year_average?;
    Some(average? - standard)
}

fn site_table(site: &ReportSite) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Maturity group"), header_cell("Variety")];
    header.extend(site.years.iter().map(|year| header_cell(&year.to_string())));
    header.push(header_cell("Average"));
    header.push(header_cell("± st."));
    table.set_header(header);
    apply_table_style(&mut table);

    for group in &site.groups {
        for row in &group.rows {
            let is_standard = group.default_standard_variety_id.as_ref() == Some(&row.variety_id);
            let name = if is_standard {
                Cell::new(format!("{} (st)", row.variety_name)).add_attribute(Attribute::Bold)
            } else {
                Cell::new(&row.variety_name)
            };
            let mut cells = vec![Cell::new(&group.maturity_group), name];
            cells.extend(site.years.iter().map(|year| number_cell(row.yield_for(*year), 1)));
            cells.push(number_cell(row.multi_year_average, 1));
            cells.push(if is_standard {
                dim_cell(MISSING)
            } else {
                delta_cell(over_standard(group, row.multi_year_average), 1)
            });
            table.add_row(cells);
        }
    }
    align_right(&mut table, 2);
    table
}

/// Headings and one table per site.
pub fn report_text(tree: &ReportTree) -> String {
    let mut out = String::new();
    if tree.regions.is_empty() {
        out.push_str("No trials match the filter.\n");
        return out;
    }
    for region in &tree.regions {
        out.push_str(&format!("Region: {}\n", region.region));
        if region.sites.is_empty() {
            out.push_str("  (no data)\n");
        }
        for site in &region.sites {
            out.push_str(&format!("Site: {} [{}]\n", site.site_name, site.site_id));
            out.push_str(&format!("{}\n", site_table(site)));
        }
        out.push('\n');
    }
    out
}

/// One line per variety row. Absent numbers are empty fields.
pub fn report_csv(tree: &ReportTree) -> Result<String> {
    let years = tree.filter.year_list();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<String> = [
        "region",
        "site_id",
        "site_name",
        "maturity_group",
        "variety_id",
        "variety_name",
        "default_standard",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect();
    header.extend(years.iter().map(|year| format!("yield_{year}")));
    header.push("average".to_string());
    writer.write_record(&header).context("write CSV header")?;

    let csv_number = |value: Option<f64>| value.map(|v| format!("{v:.2}")).unwrap_or_default();
    for region in &tree.regions {
        for site in &region.sites {
            for group in &site.groups {
                for row in &group.rows {
                    let is_standard =
                        group.default_standard_variety_id.as_ref() == Some(&row.variety_id);
                    let mut record = vec![
                        region.region.clone(),
                        site.site_id.to_string(),
                        site.site_name.clone(),
                        group.maturity_group.clone(),
                        row.variety_id.to_string(),
                        row.variety_name.clone(),
                        is_standard.to_string(),
                    ];
                    record.extend(years.iter().map(|year| csv_number(row.yield_for(*year))));
                    record.push(csv_number(row.multi_year_average));
                    writer.write_record(&record).context("write CSV row")?;
                }
            }
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(csv::IntoInnerError::into_error)
        .context("flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

pub fn live_table(trial: &Trial, live: &LiveComputation) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Participant"),
        header_cell("Variety"),
        header_cell("Mean"),
        header_cell("Std dev"),
        header_cell("CV %"),
        header_cell("± st."),
        header_cell("± st. %"),
        header_cell("LSD"),
        header_cell("Significant"),
    ]);
    apply_table_style(&mut table);
    for participant in &trial.participants {
        let Some(computed) = live.for_participant(&participant.id) else {
            continue;
        };
        let is_standard = live.standard_participant_id.as_ref() == Some(&participant.id);
        let variety = if is_standard {
            Cell::new(format!("{} (st)", participant.variety_name)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&participant.variety_name)
        };
        let significant = match computed.exceeds_lsd {
            Some(true) => Cell::new("yes").fg(Color::Green),
            Some(false) => Cell::new("no"),
            None => dim_cell(MISSING),
        };
        table.add_row(vec![
            Cell::new(participant.id.as_str()),
            variety,
            number_cell(computed.yield_avg, 2),
            number_cell(computed.yield_stddev, 2),
            number_cell(computed.yield_cv, 1),
            delta_cell(computed.over_std_abs, 2),
            delta_cell(computed.over_std_pct, 1),
            number_cell(computed.lsd, 2),
            significant,
        ]);
    }
    align_right(&mut table, 2);
    table
}

pub fn schema_table(schema: &IndicatorSchema) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Key"),
        header_cell("Indicator"),
        header_cell("Kind"),
        header_cell("Required"),
        header_cell("Range"),
    ]);
    apply_table_style(&mut table);
    for group in &schema.groups {
        for def in &group.indicators {
            let kind = match def.kind {
                IndicatorKind::Input => Cell::new("input"),
                IndicatorKind::Computed => dim_cell("computed"),
            };
            let range = match (def.min, def.max) {
                (Some(min), Some(max)) => Cell::new(format!("{min}..{max}")),
                _ => dim_cell(MISSING),
            };
            table.add_row(vec![
                Cell::new(group.name),
                Cell::new(def.key),
                Cell::new(def.display_label()),
                kind,
                Cell::new(if def.required { "yes" } else { "" }),
                range,
            ]);
        }
    }
    table
}

pub fn issues_table(report: &ValidationReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Participant"),
        header_cell("Key"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    let mut issues: Vec<_> = report.issues.iter().collect();
    issues.sort_by_key(|issue| match issue.severity {
        IssueSeverity::Error => 0,
        IssueSeverity::Warning => 1,
    });
    for issue in issues {
        let severity = match issue.severity {
            IssueSeverity::Error => Cell::new("ERROR").fg(Color::Red),
            IssueSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
        };
        table.add_row(vec![
            severity,
            Cell::new(issue.participant_id.as_str()),
            Cell::new(&issue.key),
            Cell::new(&issue.message),
        ]);
    }
    table
}

/// `(trial, site name, region)` triples, already resolved by the caller.
pub fn trials_table(trials: &[(Trial, String, String)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Trial"),
        header_cell("Year"),
        header_cell("Culture"),
        header_cell("Region"),
        header_cell("Site"),
        header_cell("Predecessor"),
        header_cell("Participants"),
        header_cell("Standard"),
    ]);
    apply_table_style(&mut table);
    for (trial, site_name, region) in trials {
        let standard = match trial.standard_count() {
            1 => trial
                .standard()
                .map_or_else(|| dim_cell(MISSING), |p| Cell::new(&p.variety_name)),
            0 => Cell::new("none").fg(Color::Yellow),
            n => Cell::new(format!("{n} flagged")).fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(trial.id.as_str()),
            Cell::new(trial.year),
            Cell::new(trial.culture_id.as_str()),
            Cell::new(region),
            Cell::new(site_name),
            trial
                .predecessor
                .as_deref()
                .map_or_else(|| dim_cell(MISSING), Cell::new),
            Cell::new(trial.participants.len()),
            standard,
        ]);
    }
    table
}

pub fn outcomes_table(outcomes: &[VarietyOutcome]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variety"),
        header_cell("Mean"),
        header_cell("Standard"),
        header_cell("Deviation"),
        header_cell("Summary"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    for outcome in outcomes {
        let name = if outcome.is_standard {
            Cell::new(format!("{} (st)", outcome.variety_name)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&outcome.variety_name)
        };
        table.add_row(vec![
            name,
            Cell::new(format!("{:.2}", outcome.variety_mean)),
            Cell::new(format!("{:.2}", outcome.standard_mean)),
            delta_cell(Some(outcome.deviation), 2),
            Cell::new(&outcome.summary),
            Cell::new(outcome.status.as_str()),
        ]);
    }
    align_right(&mut table, 1);
    table
}

pub fn history_table(entries: &[VarietyTrialEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Year"),
        header_cell("Trial"),
        header_cell("Type"),
        header_cell("Site"),
        header_cell("Role"),
        header_cell("Values"),
    ]);
    apply_table_style(&mut table);
    for entry in entries {
        let values = entry
            .records
            .iter()
            .map(|record| format!("{}={}", record.indicator_key, record.raw_value))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(entry.year),
            Cell::new(entry.trial_id.as_str()),
            entry
                .trial_type
                .as_deref()
                .map_or_else(|| dim_cell(MISSING), Cell::new),
            Cell::new(&entry.site_name),
            Cell::new(if entry.is_standard { "standard" } else { "candidate" }),
            Cell::new(values),
        ]);
    }
    table
}

pub fn sites_table(entries: &[&SiteEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Region"),
        header_cell("Site id"),
        header_cell("Site"),
    ]);
    apply_table_style(&mut table);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.oblast_name),
            Cell::new(&entry.site_id),
            Cell::new(&entry.site_name),
        ]);
    }
    table
}
