//! Generate command: writes yearly markdown report files.
//!
//! Layout under the output directory:
//!
//! ```text
//! <output>/<year>/index.md
//! <output>/<year>/01-january.md
//! <output>/<year>/02-february.md
//! ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Datelike;
use chrono_tz::Tz;
use lume_core::YearReport;

use crate::commands::util;
use crate::config::Config;
use crate::render;

/// Writes the index and month pages of one year, returning the year directory.
pub fn write_year(output_dir: &Path, report: &YearReport) -> Result<PathBuf> {
    let year_dir = output_dir.join(report.year.to_string());
    fs::create_dir_all(&year_dir)
        .with_context(|| format!("failed to create {}", year_dir.display()))?;

    let index = render::render_year_index(report)?;
    write_file(&year_dir.join("index.md"), &index)?;

    for month in &report.months {
        let page = render::render_month(month, report.year)?;
        write_file(&year_dir.join(render::month_file_name(month.month)), &page)?;
    }

    tracing::debug!(
        year = report.year,
        months = report.months.len(),
        dir = %year_dir.display(),
        "wrote year reports"
    );
    Ok(year_dir)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Runs the generate command for one year (default: the current year).
pub fn run(config: &Config, tz: &Tz, year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(|| util::today(tz).year());

    eprintln!(
        "Loading timewarrior data from {}",
        config.timewarrior_dir.display()
    );
    let entries = util::load_entries(&config.timewarrior_dir, tz)?;
    eprintln!("Found {} time entries", entries.len());

    let report = lume_core::year_report(&entries, year);
    let year_dir = write_year(&config.output_dir, &report)?;
    println!("Report generated: {}", year_dir.display());
    Ok(())
}
