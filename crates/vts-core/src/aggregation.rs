//! Multi-year report aggregation.
//!
//! Builds the region -> site -> maturity group -> variety tree for one
//! culture over a set of years. The build is a pure function of the store
//! contents and the filter; every intermediate map is ordered, so repeated
//! runs produce identical output.
//!
//! # Pipeline
//!
//! 1. Select trials by culture, year and predecessor, then scope by region.
//! 2. Resolve each trial's records and accumulate one row per
//!    (region, site, variety): yearly plot means plus secondary indicators.
//! 3. Count standard flags per variety across every contributing trial.
//! 4. Bucket rows by maturity group, pick each bucket's default standard by
//!    vote count, then sort.

use std::collections::{BTreeMap, btree_map::Entry};

use tracing::{debug, info, info_span, warn};
use vts_indicators::keys;
use vts_model::{
    ParticipantId, ReportFilter, ReportGroup, ReportRegion, ReportRow, ReportSite, ReportTree,
    SiteId, Trial, VarietyId, VarietyMetadata, YearIndicators,
};
use vts_store::TrialStore;

use crate::resolver::ResolvedResults;
use crate::stats;

/// Label for varieties without a known maturity group.
pub const MATURITY_PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub maturity_placeholder: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            maturity_placeholder: MATURITY_PLACEHOLDER.to_string(),
        }
    }
}

/// Builds the report with default options.
pub fn build_report<S>(store: &S, filter: &ReportFilter) -> ReportTree
where
    S: TrialStore + ?Sized,
{
    build_report_with_options(store, filter, &ReportOptions::default())
}

/// Trials of the filter's culture, years and predecessor, in store order.
///
/// Region scoping needs the site catalog and happens later.
pub fn matching_trials<S>(store: &S, filter: &ReportFilter) -> Vec<Trial>
where
    S: TrialStore + ?Sized,
{
    store
        .list_trials()
        .into_iter()
        .filter(|trial| trial.culture_id == filter.culture_id)
        .filter(|trial| filter.years.contains(&trial.year))
        .filter(|trial| match &filter.predecessor {
            Some(predecessor) => trial.predecessor.as_deref() == Some(predecessor.as_str()),
            None => true,
        })
        .collect()
}

pub fn build_report_with_options<S>(
    store: &S,
    filter: &ReportFilter,
    options: &ReportOptions,
) -> ReportTree
where
    S: TrialStore + ?Sized,
{
    let span = info_span!(
        "build_report",
        culture = %filter.culture_id,
        years = ?filter.years,
        region = filter.region.as_deref().unwrap_or("*"),
    );
    let _guard = span.enter();

    let trials = matching_trials(store, filter);
    let mut acc = Accumulator::new(store, filter);
    for trial in &trials {
        acc.add_trial(trial);
    }
    let contributing = acc.contributing;
    let regions = acc.finish(options);

    let regions = if regions.is_empty() {
        match &filter.region {
            Some(region) => vec![ReportRegion::scaffold(region.clone(), filter.year_list())],
            None => Vec::new(),
        }
    } else {
        regions
    };

    let tree = ReportTree {
        filter: filter.clone(),
        regions,
    };
    info!(
        matched = trials.len(),
        contributing,
        sites = tree.site_count(),
        rows = tree.row_count(),
        "report built"
    );
    tree
}

/// Secondary indicators present for one participant.
pub fn year_indicators(
    resolved: &ResolvedResults<'_>,
    participant: &ParticipantId,
) -> YearIndicators {
    let value = |key: &str| resolved.number(participant, key);
    YearIndicators {
        veg_days: value(keys::VEGETATION_PERIOD),
        thousand_weight: value(keys::THOUSAND_GRAIN_WEIGHT),
        resist_shatter: value(keys::SHATTERING_RESISTANCE),
        resist_lodge: value(keys::LODGING_RESISTANCE),
        resist_drought: value(keys::DROUGHT_RESISTANCE),
        smut: value(keys::SMUT),
        stem_rust: value(keys::STEM_RUST),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

struct RowAcc {
    variety_id: VarietyId,
    variety_name: String,
    yields: BTreeMap<i32, f64>,
    indicators: BTreeMap<i32, YearIndicators>,
}

struct SiteAcc {
    site_id: SiteId,
    /// Insertion order decides default-standard ties.
    rows: Vec<RowAcc>,
    index: BTreeMap<VarietyId, usize>,
}

impl SiteAcc {
    fn new(site_id: SiteId) -> Self {
        Self {
            site_id,
            rows: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    fn row(&mut self, variety_id: &VarietyId, name: impl FnOnce() -> String) -> &mut RowAcc {
        let index = match self.index.entry(variety_id.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                self.rows.push(RowAcc {
                    variety_id: variety_id.clone(),
                    variety_name: name(),
                    yields: BTreeMap::new(),
                    indicators: BTreeMap::new(),
                });
                *entry.insert(self.rows.len() - 1)
            }
        };
        &mut self.rows[index]
    }
}

struct Accumulator<'s, S: ?Sized> {
    store: &'s S,
    filter: &'s ReportFilter,
    regions: BTreeMap<String, BTreeMap<SiteId, SiteAcc>>,
    /// Standard flags per variety across all contributing trials.
    votes: BTreeMap<VarietyId, usize>,
    varieties: BTreeMap<VarietyId, Option<VarietyMetadata>>,
    contributing: usize,
}

impl<'s, S> Accumulator<'s, S>
where
    S: TrialStore + ?Sized,
{
    fn new(store: &'s S, filter: &'s ReportFilter) -> Self {
        Self {
            store,
            filter,
            regions: BTreeMap::new(),
            votes: BTreeMap::new(),
            varieties: BTreeMap::new(),
            contributing: 0,
        }
    }

    fn variety(&mut self, variety_id: &VarietyId) -> Option<&VarietyMetadata> {
        let store = self.store;
        self.varieties
            .entry(variety_id.clone())
            .or_insert_with(|| store.lookup_variety(variety_id))
            .as_ref()
    }

    fn add_trial(&mut self, trial: &Trial) {
        let region = self
            .store
            .lookup_region_for_site(&trial.location_id)
            .unwrap_or_else(|| trial.location_id.to_string());
        if let Some(wanted) = &self.filter.region
            && wanted != &region
        {
            debug!(trial = %trial.id, %region, "trial outside requested region");
            return;
        }

        let standards = trial.standard_count();
        let votes_count = standards == 1;
        if !votes_count {
            warn!(
                trial = %trial.id,
                standards,
                "trial does not have exactly one standard; its standard flags are ignored"
            );
        }

        let records = self.store.list_results_for_trial(trial);
        let resolved = ResolvedResults::resolve(trial, &records);
        debug!(
            trial = %trial.id,
            year = trial.year,
            site = %trial.location_id,
            participants = trial.participants.len(),
            records = records.len(),
            "accumulating trial"
        );
        self.contributing += 1;

        for participant in &trial.participants {
            if votes_count && participant.is_standard {
                *self.votes.entry(participant.variety_id.clone()).or_default() += 1;
            }

            let registry_name = self.variety(&participant.variety_id).map(|v| v.name.clone());
            let plot_mean = resolved.plot_mean(&participant.id);
            let indicators = year_indicators(&resolved, &participant.id);

            let site = self
                .regions
                .entry(region.clone())
                .or_default()
                .entry(trial.location_id.clone())
                .or_insert_with(|| SiteAcc::new(trial.location_id.clone()));
            let row = site.row(&participant.variety_id, || {
                registry_name
                    .as_deref()
                    .and_then(non_blank)
                    .or_else(|| non_blank(&participant.variety_name))
                    .unwrap_or_else(|| participant.variety_id.to_string())
            });

            if let Some(mean) = plot_mean {
                row.yields.insert(trial.year, mean);
            }
            if !indicators.is_empty() {
                row.indicators
                    .entry(trial.year)
                    .or_default()
                    .merge(&indicators);
            }
        }
    }

    fn finish(mut self, options: &ReportOptions) -> Vec<ReportRegion> {
        let years = self.filter.year_list();
        let regions = std::mem::take(&mut self.regions);
        let mut out = Vec::with_capacity(regions.len());

        for (region, sites) in regions {
            let mut report_sites: Vec<ReportSite> = sites
                .into_values()
                .map(|site| self.finish_site(site, &years, options))
                .collect();
            report_sites.sort_by(|a, b| {
                a.site_name
                    .cmp(&b.site_name)
                    .then_with(|| a.site_id.cmp(&b.site_id))
            });
            out.push(ReportRegion {
                region,
                years: years.clone(),
                sites: report_sites,
            });
        }
        out
    }

    fn finish_site(
        &mut self,
        site: SiteAcc,
        years: &[i32],
        options: &ReportOptions,
    ) -> ReportSite {
        let mut buckets: BTreeMap<String, Vec<ReportRow>> = BTreeMap::new();
        for row in site.rows {
            let maturity_group = self
                .variety(&row.variety_id)
                .and_then(|v| v.maturity_group.as_deref())
                .and_then(non_blank)
                .unwrap_or_else(|| options.maturity_placeholder.clone());

            let mut report_row = ReportRow::new(
                row.variety_id,
                row.variety_name,
                maturity_group.clone(),
                &self.filter.years,
            );
            let present: Vec<f64> = row.yields.values().copied().collect();
            for (year, mean) in row.yields {
                report_row.yield_by_year.insert(year, Some(mean));
            }
            report_row.indicators_by_year = row.indicators;
            report_row.multi_year_average = stats::mean(&present);
            buckets.entry(maturity_group).or_default().push(report_row);
        }

        let groups = buckets
            .into_iter()
            .map(|(maturity_group, mut rows)| {
                let default_standard_variety_id = self.default_standard(&rows);
                rows.sort_by(|a, b| {
                    let a = a.multi_year_average.unwrap_or(f64::NEG_INFINITY);
                    let b = b.multi_year_average.unwrap_or(f64::NEG_INFINITY);
                    b.total_cmp(&a)
                });
                ReportGroup {
                    maturity_group,
                    rows,
                    default_standard_variety_id,
                }
            })
            .collect();

        let site_name = self
            .store
            .lookup_site_name(&site.site_id)
            .unwrap_or_else(|| site.site_id.to_string());
        ReportSite {
            site_id: site.site_id,
            site_name,
            years: years.to_vec(),
            groups,
        }
    }

    /// Most standard flags wins; ties go to the earliest row.
    fn default_standard(&self, rows: &[ReportRow]) -> Option<VarietyId> {
        let mut best: Option<(&VarietyId, usize)> = None;
        for row in rows {
            let count = self.votes.get(&row.variety_id).copied().unwrap_or(0);
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((&row.variety_id, count));
            }
        }
        best.map(|(id, _)| id.clone())
    }
}
