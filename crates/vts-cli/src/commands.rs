use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, info_span, warn};

use vts_cli::config::AppConfig;
use vts_cli::render::{
    history_table, issues_table, live_table, outcomes_table, report_csv, report_text,
    schema_table, sites_table, to_json, trials_table,
};
use vts_core::{
    LiveOptions, ResolvedResults, build_report_with_options, resolve_live_computation_with,
    summarize_trial, variety_history,
};
use vts_indicators::{get_indicator_schema, validate_trial_values};
use vts_model::{
    CultureId, IndicatorKey, ParticipantId, ReportFilter, SiteId, Trial, TrialDraft, TrialId,
    ValuesMap, VarietyId,
};
use vts_store::{
    MemoryStore, SiteCatalog, Snapshot, TrialStore, open_store, save_snapshot, save_store,
    seed_snapshot, sha256_hex,
};

use crate::cli::{
    CreateTrialArgs, EnterArgs, HistoryArgs, InitArgs, LiveArgs, OutputFormatArg, ReportArgs,
    SchemaArgs, SitesArgs, TrialArgs, TrialsArgs,
};

/// Store location and settings resolved from flags and the config file.
pub struct Session {
    pub config: AppConfig,
    pub store_path: PathBuf,
    pub sites_path: Option<PathBuf>,
}

impl Session {
    pub fn new(config: AppConfig, store: Option<PathBuf>, sites: Option<PathBuf>) -> Self {
        let store_path = store.unwrap_or_else(|| config.store.path.clone());
        let sites_path = sites.or_else(|| config.store.sites_csv.clone());
        Self {
            config,
            store_path,
            sites_path,
        }
    }

    fn catalog(&self) -> Result<SiteCatalog> {
        match &self.sites_path {
            Some(path) => SiteCatalog::from_path(path)
                .with_context(|| format!("load site catalog {}", path.display())),
            None => SiteCatalog::bundled().context("load bundled site catalog"),
        }
    }

    fn open(&self) -> Result<MemoryStore> {
        if !self.store_path.exists() {
            bail!(
                "store {} does not exist; run `vts init` first",
                self.store_path.display()
            );
        }
        open_store(&self.store_path, self.catalog()?)
            .with_context(|| format!("open store {}", self.store_path.display()))
    }

    fn save(&self, store: &MemoryStore) -> Result<()> {
        save_store(store, &self.store_path)
            .with_context(|| format!("save store {}", self.store_path.display()))
    }
}

fn find_trial(store: &MemoryStore, id: &str) -> Result<Trial> {
    let trial_id = TrialId::new(id).context("trial id")?;
    store
        .get_trial(&trial_id)
        .ok_or_else(|| anyhow!("unknown trial {trial_id}"))
}

fn emit(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}

fn no_csv(format: OutputFormatArg) -> Result<()> {
    if format == OutputFormatArg::Csv {
        bail!("CSV output is only available for reports");
    }
    Ok(())
}

pub fn run_report(session: &Session, args: &ReportArgs) -> Result<()> {
    let mut filter = ReportFilter::new(
        CultureId::new(&args.culture).context("culture id")?,
        args.years.iter().copied(),
    );
    filter.predecessor = args.predecessor.clone();
    filter.region = args.region.clone();

    let store = session.open()?;
    let tree = build_report_with_options(&store, &filter, &session.config.report_options());

    let text = match args.format {
        OutputFormatArg::Table => report_text(&tree),
        OutputFormatArg::Json => to_json(&tree)?,
        OutputFormatArg::Csv => report_csv(&tree)?,
    };
    match &args.output {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), rows = tree.row_count(), "report written");
        }
        None => emit(&text),
    }

    if args.fingerprint {
        let bytes = serde_json::to_vec(&tree).context("serialize report")?;
        eprintln!("sha256: {}", sha256_hex(&bytes));
    }
    Ok(())
}

pub fn run_live(session: &Session, args: &LiveArgs) -> Result<()> {
    no_csv(args.format)?;
    let store = session.open()?;
    let trial = find_trial(&store, &args.trial)?;
    let records = store.list_results_for_trial(&trial);
    let resolved = ResolvedResults::resolve(&trial, &records);

    let options = LiveOptions {
        standard_override: args
            .standard
            .as_deref()
            .map(ParticipantId::new)
            .transpose()
            .context("standard participant id")?,
        lsd: session.config.lsd_params(),
    };
    let live = resolve_live_computation_with(&trial, resolved.values(), &options);

    match args.format {
        OutputFormatArg::Json => emit(&to_json(&live)?),
        _ => {
            println!("Trial {} ({}, {})", trial.id, trial.culture_id, trial.year);
            println!("{}", live_table(&trial, &live));
        }
    }
    Ok(())
}

pub fn run_schema(args: &SchemaArgs) -> Result<()> {
    no_csv(args.format)?;
    let culture = CultureId::new(&args.culture).context("culture id")?;
    let schema = get_indicator_schema(&culture);
    match args.format {
        OutputFormatArg::Json => emit(&to_json(&schema)?),
        _ => {
            let label = schema.culture_label.unwrap_or(schema.culture_id.as_str());
            if schema.fallback {
                println!("{label}: no dedicated schema, showing the default indicator set");
            } else {
                println!("{label}");
            }
            println!("{}", schema_table(&schema));
        }
    }
    Ok(())
}

/// Returns whether validation found errors.
pub fn run_validate(session: &Session, args: &TrialArgs) -> Result<bool> {
    no_csv(args.format)?;
    let store = session.open()?;
    let trial = find_trial(&store, &args.trial)?;
    let records = store.list_results_for_trial(&trial);
    let resolved = ResolvedResults::resolve(&trial, &records);
    let schema = get_indicator_schema(&trial.culture_id);
    let report = validate_trial_values(&schema, &trial, resolved.values());

    match args.format {
        OutputFormatArg::Json => emit(&to_json(&report)?),
        _ => {
            if !report.issues.is_empty() {
                println!("{}", issues_table(&report));
            }
            println!(
                "{}: {} error(s), {} warning(s)",
                report.trial_id,
                report.error_count(),
                report.warning_count()
            );
        }
    }
    Ok(report.has_errors())
}

pub fn run_trials(session: &Session, args: &TrialsArgs) -> Result<()> {
    let store = session.open()?;
    let rows: Vec<(Trial, String, String)> = store
        .list_trials()
        .into_iter()
        .filter(|trial| {
            args.culture
                .as_deref()
                .is_none_or(|culture| trial.culture_id.as_str() == culture)
        })
        .filter(|trial| args.year.is_none_or(|year| trial.year == year))
        .map(|trial| {
            let site = store
                .lookup_site_name(&trial.location_id)
                .unwrap_or_else(|| trial.location_id.to_string());
            let region = store
                .lookup_region_for_site(&trial.location_id)
                .unwrap_or_else(|| trial.location_id.to_string());
            (trial, site, region)
        })
        .collect();

    if rows.is_empty() {
        println!("No trials.");
    } else {
        println!("{}", trials_table(&rows));
    }
    Ok(())
}

pub fn run_history(session: &Session, args: &HistoryArgs) -> Result<()> {
    no_csv(args.format)?;
    let store = session.open()?;
    let variety = VarietyId::new(&args.variety).context("variety id")?;
    let entries = variety_history(&store, &variety);
    match args.format {
        OutputFormatArg::Json => emit(&to_json(&entries)?),
        _ => {
            let name = store
                .lookup_variety(&variety)
                .map_or_else(|| variety.to_string(), |v| v.name);
            println!("{name}: {} trial(s)", entries.len());
            if !entries.is_empty() {
                println!("{}", history_table(&entries));
            }
        }
    }
    Ok(())
}

pub fn run_outcomes(session: &Session, args: &TrialArgs) -> Result<()> {
    no_csv(args.format)?;
    let store = session.open()?;
    let trial = find_trial(&store, &args.trial)?;
    let outcomes = summarize_trial(&trial, &store.list_results_for_trial(&trial));
    match args.format {
        OutputFormatArg::Json => emit(&to_json(&outcomes)?),
        _ if outcomes.is_empty() => {
            println!("No outcomes: the standard needs all four plot yields.");
        }
        _ => println!("{}", outcomes_table(&outcomes)),
    }
    Ok(())
}

pub fn run_init(session: &Session, args: &InitArgs) -> Result<()> {
    let path = &session.store_path;
    if path.exists() && !args.force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    let snapshot = if args.empty {
        Snapshot::default()
    } else {
        seed_snapshot().context("build starter data")?
    };
    save_snapshot(&snapshot, path).with_context(|| format!("write {}", path.display()))?;
    println!(
        "Created {} with {} trial(s)",
        path.display(),
        snapshot.trials.len()
    );
    Ok(())
}

pub fn run_create_trial(session: &Session, args: &CreateTrialArgs) -> Result<()> {
    let mut store = session.open()?;
    let site = SiteId::new(&args.site).context("site id")?;
    if store.lookup_region_for_site(&site).is_none() {
        warn!(site = %site, "site is not in the catalog; its id will be used as region");
    }

    let draft = TrialDraft {
        id: args
            .id
            .as_deref()
            .map(TrialId::new)
            .transpose()
            .context("trial id")?,
        year: args.year,
        culture_id: CultureId::new(&args.culture).context("culture id")?,
        location_id: site,
        participant_variety_ids: args
            .varieties
            .iter()
            .map(VarietyId::new)
            .collect::<Result<Vec<_>, _>>()
            .context("variety id")?,
        standard_variety_id: VarietyId::new(&args.standard).context("standard variety id")?,
        predecessor: args.predecessor.clone(),
        trial_type: args.trial_type.clone(),
    };
    let trial = store.create_trial(draft).context("create trial")?;
    session.save(&store)?;

    println!("Created trial {}", trial.id);
    for participant in &trial.participants {
        let marker = if participant.is_standard { " (st)" } else { "" };
        println!("  {}  {}{marker}", participant.id, participant.variety_name);
    }
    Ok(())
}

/// Parses `PARTICIPANT:KEY=VALUE`. The value may be empty.
pub fn parse_assignment(input: &str) -> Result<(ParticipantId, IndicatorKey, String)> {
    let (target, value) = input
        .split_once('=')
        .ok_or_else(|| anyhow!("expected PARTICIPANT:KEY=VALUE, got {input:?}"))?;
    let (participant, key) = target
        .split_once(':')
        .ok_or_else(|| anyhow!("expected PARTICIPANT:KEY=VALUE, got {input:?}"))?;
    Ok((
        ParticipantId::new(participant).context("participant id")?,
        IndicatorKey::new(key).context("indicator key")?,
        value.trim().to_string(),
    ))
}

/// Computed indicators are derived on read and never stored.
fn strip_computed(values: &mut ValuesMap, computed: &[&str]) {
    for entries in values.values_mut() {
        entries.retain(|key, _| !computed.iter().any(|k| *k == key.as_str()));
    }
}

pub fn run_enter(session: &Session, args: &EnterArgs) -> Result<()> {
    let mut store = session.open()?;
    let trial = find_trial(&store, &args.trial)?;
    let span = info_span!("enter", trial = %trial.id);
    let _guard = span.enter();

    let mut values = if args.replace {
        ValuesMap::new()
    } else {
        let records = store.list_results_for_trial(&trial);
        ResolvedResults::resolve(&trial, &records).values().clone()
    };
    for input in &args.values {
        let (participant, key, value) = parse_assignment(input)?;
        values.entry(participant).or_default().insert(key, value);
    }

    let schema = get_indicator_schema(&trial.culture_id);
    let report = validate_trial_values(&schema, &trial, &values);
    if report.has_errors() {
        println!("{}", issues_table(&report));
        if !args.force {
            bail!(
                "{} validation error(s); nothing saved (pass --force to save anyway)",
                report.error_count()
            );
        }
        warn!(errors = report.error_count(), "saving despite validation errors");
    }

    strip_computed(&mut values, &schema.computed_keys());

    let written = store.save_results(&trial.id, &values).context("save results")?;

    // Sites outside the catalog file their outcomes under the site id.
    let region = store
        .lookup_region_for_site(&trial.location_id)
        .unwrap_or_else(|| trial.location_id.to_string());
    let outcomes = summarize_trial(&trial, &store.list_results_for_trial(&trial));
    for outcome in &outcomes {
        store.record_outcome(
            &outcome.variety_id,
            &region,
            outcome.year_outcome(),
            outcome.status,
        );
    }

    session.save(&store)?;
    println!("Saved {written} value(s) for trial {}", trial.id);
    if !outcomes.is_empty() {
        println!("{}", outcomes_table(&outcomes));
    }
    Ok(())
}

pub fn run_sites(session: &Session, args: &SitesArgs) -> Result<()> {
    let catalog = session.catalog()?;
    let entries: Vec<_> = catalog
        .entries()
        .iter()
        .filter(|entry| {
            args.region
                .as_deref()
                .is_none_or(|region| entry.oblast_name == region)
        })
        .collect();
    println!("{}", sites_table(&entries));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_participant_key_and_value() {
        let (participant, key, value) = parse_assignment("p-var-001:yield_plot1= 32,4").unwrap();
        assert_eq!(participant.as_str(), "p-var-001");
        assert_eq!(key.as_str(), "yield_plot1");
        assert_eq!(value, "32,4");

        let (_, _, value) = parse_assignment("p:smut=").unwrap();
        assert_eq!(value, "");
    }

    #[test]
    fn computed_keys_are_stripped_before_save() {
        let mut values = ValuesMap::new();
        for input in ["p-1:yield_plot1=30", "p-1:yield_avg=30", "p-2:smut=1"] {
            let (participant, key, value) = parse_assignment(input).unwrap();
            values.entry(participant).or_default().insert(key, value);
        }
        strip_computed(&mut values, &["yield_avg"]);

        let keys: Vec<_> = values
            .values()
            .flat_map(|entries| entries.keys().map(IndicatorKey::as_str))
            .collect();
        assert_eq!(keys, ["yield_plot1", "smut"]);
    }

    #[test]
    fn malformed_assignment_is_rejected() {
        assert!(parse_assignment("p-var-001=3").is_err());
        assert!(parse_assignment("p-var-001:yield_plot1").is_err());
        assert!(parse_assignment(":yield_plot1=3").is_err());
    }
}
