//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Markdown time reports from timewarrior data.
///
/// Reads timewarrior's interval log (or its extension protocol on stdin),
/// aggregates tracked time by day, week, month and year, and renders
/// markdown reports.
#[derive(Debug, Parser)]
#[command(name = "lume", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Timewarrior data directory (overrides the configured one).
    #[arg(long, global = true, value_name = "DIR")]
    pub timewarrior: Option<PathBuf>,

    /// Report output directory (overrides the configured one).
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a year of markdown reports to the output directory.
    Generate {
        /// Calendar year to generate (defaults to the current year).
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Print a report for a day, week, month or date range.
    Report(ReportArgs),

    /// Show the effective configuration, or save --timewarrior/--output.
    Config,

    /// Run as a timewarrior extension, reading the report protocol on stdin.
    Extension,
}

/// Arguments shared by every report period.
#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub period: ReportPeriod,

    /// Output as JSON instead of markdown.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Report periods.
#[derive(Debug, Clone, Subcommand)]
pub enum ReportPeriod {
    /// One local calendar day.
    Day {
        /// Day to report, YYYY-MM-DD (defaults to today).
        #[arg(short, long)]
        time: Option<String>,
    },

    /// The ISO week (Monday to Sunday) containing a day.
    Week {
        /// Any day of the week, YYYY-MM-DD (defaults to today).
        #[arg(short, long)]
        time: Option<String>,
    },

    /// One calendar month.
    Month {
        /// Month to report, YYYY-MM (defaults to the current month).
        #[arg(short, long)]
        time: Option<String>,
    },

    /// An inclusive range of days.
    Range {
        /// First day, YYYY-MM-DD.
        #[arg(long)]
        from: String,

        /// Last day (inclusive), YYYY-MM-DD.
        #[arg(long)]
        to: String,
    },
}
