//! Variety trial studio CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use vts_cli::config::AppConfig;
use vts_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    Session, run_create_trial, run_enter, run_history, run_init, run_live, run_outcomes,
    run_report, run_schema, run_sites, run_trials, run_validate,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let config = match AppConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };
    let session = Session::new(config, cli.store.clone(), cli.sites.clone());

    let result = match &cli.command {
        Command::Report(args) => run_report(&session, args).map(|()| 0),
        Command::Live(args) => run_live(&session, args).map(|()| 0),
        Command::Schema(args) => run_schema(args).map(|()| 0),
        Command::Validate(args) => run_validate(&session, args).map(i32::from),
        Command::Trials(args) => run_trials(&session, args).map(|()| 0),
        Command::History(args) => run_history(&session, args).map(|()| 0),
        Command::Outcomes(args) => run_outcomes(&session, args).map(|()| 0),
        Command::Init(args) => run_init(&session, args).map(|()| 0),
        Command::CreateTrial(args) => run_create_trial(&session, args).map(|()| 0),
        Command::Enter(args) => run_enter(&session, args).map(|()| 0),
        Command::Sites(args) => run_sites(&session, args).map(|()| 0),
    };
    let exit_code = match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Explicit `--log-level` beats `-v/-q`; either one disables `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };

    let mut config = LogConfig::default()
        .with_level(level_filter)
        .with_format(format)
        .with_ansi(with_ansi)
        .with_log_file(cli.log_file.clone());
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config
}
