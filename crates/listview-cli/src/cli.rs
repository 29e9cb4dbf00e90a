//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use listview_cli::flags::QueryArgs;
use listview_model::RecordId;

#[derive(Parser)]
#[command(
    name = "listview",
    version,
    about = "Query, export, and edit a JSON record store through the list-view engine"
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

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show one page of the filtered, sorted records.
    Query(QueryCommand),

    /// Export every matching record to CSV after recording a reason.
    Export(ExportCommand),

    /// Delete records and show the refreshed page.
    Delete(DeleteCommand),
}

#[derive(Args)]
pub struct StoreArgs {
    /// JSON array of records, each with an `id`.
    #[arg(value_name = "STORE")]
    pub store: PathBuf,

    /// Screen configuration (TOML).
    #[arg(long, value_name = "TOML")]
    pub screen: PathBuf,
}

#[derive(Args)]
pub struct QueryCommand {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args)]
pub struct ExportCommand {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Why the data is leaving the system (10 to 255 characters).
    #[arg(long)]
    pub reason: String,

    /// Directory for the CSV file (default: current directory).
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Append-only audit log (JSON Lines).
    #[arg(long = "audit-log", value_name = "PATH", default_value = "export-audit.jsonl")]
    pub audit_log: PathBuf,
}

#[derive(Args)]
pub struct DeleteCommand {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Record to delete (repeatable).
    #[arg(long = "id", value_name = "ID", required = true)]
    pub ids: Vec<RecordId>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
