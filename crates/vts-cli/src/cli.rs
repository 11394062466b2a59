//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "vts",
    version,
    about = "Variety trial studio - multi-year variety trial reports",
    long_about = "Aggregate state variety trial results into multi-year reports.\n\n\
                  Reads a JSON store of trials and plot results, resolves trial sites\n\
                  to regions, and compares varieties against their standard."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: ./vts.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// JSON store file (overrides the config file).
    #[arg(long = "store", value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Site catalog CSV replacing the bundled one.
    #[arg(long = "sites", value_name = "PATH", global = true)]
    pub sites: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the multi-year report for one culture.
    Report(ReportArgs),

    /// Recompute entry-screen statistics for one trial.
    Live(LiveArgs),

    /// Show the indicator schema of a culture.
    Schema(SchemaArgs),

    /// Check a trial's stored values against its culture's schema.
    Validate(TrialArgs),

    /// List trials in the store.
    Trials(TrialsArgs),

    /// Show every trial a variety has results in.
    History(HistoryArgs),

    /// Year outcomes of each variety in a trial.
    Outcomes(TrialArgs),

    /// Create a store file with starter data.
    Init(InitArgs),

    /// Add a trial to the store.
    CreateTrial(CreateTrialArgs),

    /// Enter or replace values for a trial and save them.
    Enter(EnterArgs),

    /// List the site catalog.
    Sites(SitesArgs),
}

#[derive(Args)]
pub struct ReportArgs {
    #[arg(long = "culture", value_name = "ID")]
    pub culture: String,

    /// Year to include; repeat for several years.
    #[arg(long = "year", value_name = "YEAR", required = true)]
    pub years: Vec<i32>,

    #[arg(long = "predecessor")]
    pub predecessor: Option<String>,

    /// Region (oblast) label to scope the report to.
    #[arg(long = "region")]
    pub region: Option<String>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Write the report to a file instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the SHA-256 of the JSON report.
    #[arg(long = "fingerprint")]
    pub fingerprint: bool,
}

#[derive(Args)]
pub struct LiveArgs {
    #[arg(long = "trial", value_name = "ID")]
    pub trial: String,

    /// Participant to use as the standard instead of the flagged one.
    #[arg(long = "standard", value_name = "PARTICIPANT")]
    pub standard: Option<String>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct SchemaArgs {
    #[arg(long = "culture", value_name = "ID")]
    pub culture: String,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct TrialArgs {
    #[arg(long = "trial", value_name = "ID")]
    pub trial: String,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct TrialsArgs {
    #[arg(long = "culture", value_name = "ID")]
    pub culture: Option<String>,

    #[arg(long = "year", value_name = "YEAR")]
    pub year: Option<i32>,
}

#[derive(Args)]
pub struct HistoryArgs {
    #[arg(long = "variety", value_name = "ID")]
    pub variety: String,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing store file.
    #[arg(long = "force")]
    pub force: bool,

    /// Start with an empty store instead of the starter trial.
    #[arg(long = "empty")]
    pub empty: bool,
}

#[derive(Args)]
pub struct CreateTrialArgs {
    /// Trial id (generated when omitted).
    #[arg(long = "id")]
    pub id: Option<String>,

    #[arg(long = "year")]
    pub year: i32,

    #[arg(long = "culture", value_name = "ID")]
    pub culture: String,

    #[arg(long = "site", value_name = "ID")]
    pub site: String,

    /// Participating variety; repeat for each one.
    #[arg(long = "variety", value_name = "ID", required = true)]
    pub varieties: Vec<String>,

    /// Variety acting as the trial's standard.
    #[arg(long = "standard", value_name = "ID")]
    pub standard: String,

    #[arg(long = "predecessor")]
    pub predecessor: Option<String>,

    #[arg(long = "trial-type")]
    pub trial_type: Option<String>,
}

#[derive(Args)]
pub struct EnterArgs {
    #[arg(long = "trial", value_name = "ID")]
    pub trial: String,

    /// Value as PARTICIPANT:KEY=VALUE; repeat for each value.
    #[arg(long = "set", value_name = "PARTICIPANT:KEY=VALUE", required = true)]
    pub values: Vec<String>,

    /// Drop previously stored values of the trial instead of merging.
    #[arg(long = "replace")]
    pub replace: bool,

    /// Save even if validation reports errors.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Args)]
pub struct SitesArgs {
    /// Only sites of this region (oblast) label.
    #[arg(long = "region")]
    pub region: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
