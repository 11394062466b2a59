//! Reporting core for variety trials.
//!
//! Reads trials through [`vts_store::TrialStore`] and never writes. The
//! report build, the live entry computation and the outcome summary all
//! share the same result resolution and statistics.

pub mod aggregation;
pub mod history;
pub mod live;
pub mod outcome;
pub mod resolver;
pub mod stats;

pub use aggregation::{
    MATURITY_PLACEHOLDER, ReportOptions, build_report, build_report_with_options, matching_trials,
};
pub use history::{VarietyTrialEntry, variety_history};
pub use live::{
    ComputedIndicators, LiveComputation, LiveOptions, resolve_live_computation,
    resolve_live_computation_with,
};
pub use outcome::{VarietyOutcome, recommend_status, summarize_trial};
pub use resolver::ResolvedResults;
pub use stats::LsdParams;
