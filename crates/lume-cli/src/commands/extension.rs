//! Timewarrior extension front end.
//!
//! Installed as `~/.config/timewarrior/extensions/lume`, timewarrior pipes its
//! report protocol to `lume extension`. The report window picks the report
//! kind; a `generate` tag writes the yearly report files instead.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, TimeDelta, Utc};
use chrono_tz::Tz;
use lume_core::protocol::{DATA_DIR_KEY, OUTPUT_DIR_KEY};
use lume_core::{Entry, TimewConfig};

use crate::commands::generate;
use crate::commands::report::Selection;
use crate::commands::util;
use crate::config::{Config, expand_tilde};

/// Tag that switches the extension into report generation.
pub const GENERATE_TAG: &str = "generate";

const SECONDS_PER_DAY: i64 = 86_400;

/// Picks the report kind from the window length in days (rounded).
///
/// The day count only applies to a complete window. Without one, the report
/// is a range over all entries. Returns `None` when there is neither a window
/// nor any entry.
pub fn select(timew: &TimewConfig, entries: &[Entry], tz: &Tz) -> Option<Selection> {
    let (Some(start), Some(end)) = (timew.report_start(tz), timew.report_end(tz)) else {
        return entries_span(entries).map(|(start, end)| Selection::Range { start, end });
    };

    let seconds = (end - start).num_seconds();
    let days = (seconds + SECONDS_PER_DAY / 2).div_euclid(SECONDS_PER_DAY);
    let date = start.date_naive();

    let selection = match days {
        ..=1 => Selection::Day(date),
        2..=7 => Selection::Week(date),
        8..=31 => Selection::Month {
            year: date.year(),
            month: date.month(),
        },
        _ => Selection::Range { start, end },
    };
    Some(selection)
}

/// Earliest start to latest end, as a half-open window holding every entry.
fn entries_span(entries: &[Entry]) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let start = entries.iter().map(|e| *e.start()).min()?;
    // Keep a zero-length last entry inside the window
    let end = entries
        .iter()
        .map(|e| (*e.end()).max(*e.start() + TimeDelta::milliseconds(1)))
        .max()?;
    Some((start, end))
}

/// Data directory named by `temp.db`, preferring its `data/` subdirectory.
fn data_dir(timew: &TimewConfig, config: &Config) -> PathBuf {
    let Some(db) = timew.get(DATA_DIR_KEY).filter(|v| !v.is_empty()) else {
        return config.timewarrior_dir.clone();
    };
    let db = expand_tilde(Path::new(db));
    let nested = db.join("data");
    if nested.is_dir() { nested } else { db }
}

fn output_dir(timew: &TimewConfig, config: &Config) -> PathBuf {
    timew
        .get(OUTPUT_DIR_KEY)
        .filter(|v| !v.is_empty())
        .map_or_else(|| config.output_dir.clone(), |v| expand_tilde(Path::new(v)))
}

/// Writes report files for every year present in the data directory.
fn generate_all(timew: &TimewConfig, config: &Config, tz: &Tz) -> Result<()> {
    let data_dir = data_dir(timew, config);
    let output_dir = output_dir(timew, config);

    eprintln!("Loading timewarrior data from {}", data_dir.display());
    let entries = util::load_entries(&data_dir, tz)?;
    eprintln!("Found {} time entries", entries.len());

    for report in lume_core::year_reports(&entries) {
        let year_dir = generate::write_year(&output_dir, &report)?;
        println!("Report generated: {}", year_dir.display());
    }
    Ok(())
}

/// Decodes the protocol from `input` and produces the requested output.
pub fn handle<R: io::BufRead>(
    input: R,
    config: &Config,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    let decoded = lume_core::parse_extension_input(input, tz, now)
        .context("failed to decode timewarrior input")?;
    tracing::debug!(
        settings = decoded.config.len(),
        entries = decoded.entries.len(),
        "decoded extension input"
    );

    if decoded.config.has_tag(GENERATE_TAG) {
        generate_all(&decoded.config, config, tz)?;
        return Ok(None);
    }

    let Some(selection) = select(&decoded.config, &decoded.entries, tz) else {
        return Ok(Some("No entries found.\n".to_string()));
    };
    tracing::debug!(?selection, "selected report");
    selection.render(&decoded.entries, false).map(Some)
}

/// Runs the extension command against stdin.
pub fn run(config: &Config, tz: &Tz) -> Result<()> {
    let stdin = io::stdin();
    if let Some(output) = handle(stdin.lock(), config, tz, Utc::now())? {
        print!("{output}");
    }
    Ok(())
}
