//! `listview` command-line harness.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use chrono::Local;
use clap::{ColorChoice, Parser};
use tracing::{debug, level_filters::LevelFilter};

use listview_cli::commands::{ExportRequest, Reported, run_delete, run_export, run_query};
use listview_cli::logging::{LogConfig, LogFormat, init_logging};
use listview_cli::render::{print_delete, print_export, print_page};
use listview_cli::saver::DirectorySaver;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match run(cli.command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) if error.is::<Reported>() => {
            debug!(error = %error, "command failed after notifying");
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when the command completed but reported a failure.
async fn run(command: Command) -> Result<bool> {
    match command {
        Command::Query(args) => {
            let (session, report) =
                run_query(&args.store.store, &args.store.screen, &args.query).await?;
            print_page(&report, &session.columns());
            Ok(true)
        }
        Command::Export(args) => {
            let saver = DirectorySaver::new(&args.output_dir);
            let file = run_export(ExportRequest {
                store: &args.store.store,
                screen: &args.store.screen,
                query: &args.query,
                reason: &args.reason,
                output_dir: args.output_dir.clone(),
                audit_log: args.audit_log.clone(),
                today: Local::now().date_naive(),
            })
            .await?;
            if let Some(file) = file {
                print_export(&file, &saver.target(&file.file_name));
            }
            Ok(true)
        }
        Command::Delete(args) => {
            let (session, report, page) = run_delete(
                &args.store.store,
                &args.store.screen,
                &args.query,
                &args.ids,
            )
            .await?;
            print_delete(&report);
            print_page(&page, &session.columns());
            Ok(!session.notifier().has_errors())
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
