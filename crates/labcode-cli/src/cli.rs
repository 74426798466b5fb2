//! CLI argument definitions for the `labcode` validator.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "labcode",
    version,
    about = "Validate assigned laboratory test codes against their names and units",
    long_about = "Check that each record's assigned catalog code agrees with the clues in its\n\
                  free-text test name and unit, and suggest a better-fitting catalog entry\n\
                  when it does not."
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

    /// Include timestamps in log lines.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the emitting module in log lines.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    /// Allow test names and units to appear in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a CSV of records and write the judgments to a new CSV.
    Validate(ValidateArgs),

    /// List the compiled extraction rules.
    Rules(RulesArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Catalog CSV (`id,class,component,property,time,system,scale,method,...`).
    #[arg(long = "catalog", value_name = "CSV")]
    pub catalog: PathBuf,

    /// Records CSV with at least a `code` column; `name`, `unit`,
    /// `specimen` and `category` are read when present.
    #[arg(long = "records", value_name = "CSV")]
    pub records: PathBuf,

    /// Where to write the annotated records.
    #[arg(long = "output", value_name = "CSV")]
    pub output: PathBuf,

    /// Engine configuration (TOML). Replaces the built-in defaults entirely.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Unit table CSV (`raw,canonical,properties`).
    #[arg(long = "units", value_name = "CSV")]
    pub units: Option<PathBuf>,

    /// Worker threads (default: one per core).
    #[arg(long = "threads", value_name = "N")]
    pub threads: Option<usize>,
}

#[derive(Parser)]
pub struct RulesArgs {
    /// Engine configuration (TOML). Defaults to the built-in rules.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,
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
