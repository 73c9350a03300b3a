//! Report command for printing day, week, month and range reports.
//!
//! This module implements `lume report` (markdown or JSON on stdout) and the
//! shared [`Selection`] the extension front end resolves its window into.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate};
use chrono_tz::Tz;
use lume_core::Entry;

use crate::cli::{ReportArgs, ReportPeriod};
use crate::commands::util;
use crate::config::Config;
use crate::render;

/// A resolved report period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Day(NaiveDate),
    Week(NaiveDate),
    Month { year: i32, month: u32 },
    Range { start: DateTime<Tz>, end: DateTime<Tz> },
}

impl Selection {
    /// Resolves command-line selectors, defaulting to today.
    pub fn from_period(period: &ReportPeriod, tz: &Tz) -> Result<Self> {
        let today = util::today(tz);
        let selection = match period {
            ReportPeriod::Day { time } => {
                Self::Day(time.as_deref().map_or(Ok(today), util::parse_day)?)
            }
            ReportPeriod::Week { time } => {
                Self::Week(time.as_deref().map_or(Ok(today), util::parse_day)?)
            }
            ReportPeriod::Month { time } => {
                let (year, month) = time
                    .as_deref()
                    .map_or(Ok((today.year(), today.month())), util::parse_month)?;
                Self::Month { year, month }
            }
            ReportPeriod::Range { from, to } => {
                let from = util::parse_day(from)?;
                let to = util::parse_day(to)?;
                let (start, end) = util::day_range(from, to, tz)?;
                Self::Range { start, end }
            }
        };
        Ok(selection)
    }

    /// Aggregates `entries` for this period and renders it.
    pub fn render(&self, entries: &[Entry], json: bool) -> Result<String> {
        let output = match self {
            Self::Day(date) => {
                let report = lume_core::day_report(entries, *date);
                if json {
                    serde_json::to_string_pretty(&report)?
                } else {
                    render::render_day(&report)?
                }
            }
            Self::Week(date) => {
                let week = lume_core::week_report(entries, *date);
                if json {
                    serde_json::to_string_pretty(&week)?
                } else {
                    render::render_week(&week)?
                }
            }
            Self::Month { year, month } => {
                let report = lume_core::month_report(entries, *year, *month)?;
                if json {
                    serde_json::to_string_pretty(&report)?
                } else {
                    render::render_month(&report, *year)?
                }
            }
            Self::Range { start, end } => {
                let report = lume_core::range_report(entries, *start, *end)?;
                if json {
                    serde_json::to_string_pretty(&report)?
                } else {
                    render::render_range(&report)?
                }
            }
        };
        Ok(output)
    }
}

/// Runs the report command.
pub fn run(args: &ReportArgs, config: &Config, tz: &Tz) -> Result<()> {
    // Reject bad selectors before touching the data directory
    let selection = Selection::from_period(&args.period, tz)?;
    tracing::debug!(?selection, "resolved report period");

    let entries = util::load_entries(&config.timewarrior_dir, tz)?;
    let output = selection
        .render(&entries, args.json)
        .context("failed to build report")?;

    if args.json {
        println!("{output}");
    } else {
        print!("{output}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(start: (u32, u32), hours: i64, description: &str, tags: &[&str]) -> Entry {
        let start = Tz::UTC
            .with_ymd_and_hms(2024, 1, start.0, start.1, 0, 0)
            .unwrap();
        Entry::new(
            start,
            start + chrono::TimeDelta::hours(hours),
            description,
            tags.iter().copied(),
        )
        .unwrap()
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry((15, 9), 2, "write parser", &["dev"]),
            entry((15, 13), 1, "standup", &["meetings"]),
            entry((17, 9), 1, "write parser", &["dev"]),
        ]
    }

    #[test]
    fn test_from_period_day() {
        let period = ReportPeriod::Day {
            time: Some("2024-01-15".to_string()),
        };
        assert_eq!(
            Selection::from_period(&period, &Tz::UTC).unwrap(),
            Selection::Day(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
    }

    #[test]
    fn test_from_period_rejects_bad_selectors() {
        let bad_day = ReportPeriod::Day {
            time: Some("2024-1-xx".to_string()),
        };
        assert!(Selection::from_period(&bad_day, &Tz::UTC).is_err());

        let inverted = ReportPeriod::Range {
            from: "2024-02-01".to_string(),
            to: "2024-01-01".to_string(),
        };
        let err = Selection::from_period(&inverted, &Tz::UTC).unwrap_err();
        assert!(err.to_string().contains("before"));
    }

    #[test]
    fn test_from_period_defaults_to_today() {
        let period = ReportPeriod::Month { time: None };
        let today = util::today(&Tz::UTC);
        assert_eq!(
            Selection::from_period(&period, &Tz::UTC).unwrap(),
            Selection::Month {
                year: today.year(),
                month: today.month()
            }
        );
    }

    #[test]
    fn test_render_day_markdown() {
        let selection = Selection::Day(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let output = selection.render(&sample(), false).unwrap();
        assert!(output.starts_with("# Monday, Jan 15, 2024\n"));
        assert!(output.contains("> **Daily Total:** 3h\n"));
        assert!(output.contains("| 1 | write parser | 2h | 1 |"));
    }

    #[test]
    fn test_render_week_json() {
        let selection = Selection::Week(NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        let output = selection.render(&sample(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["week_number"], 3);
        assert_eq!(value["total_ms"], 4 * 3_600_000);
        assert_eq!(value["tasks"][0]["description"], "write parser");
        assert_eq!(value["tasks"][0]["sessions"], 2);
    }

    #[test]
    fn test_render_range_markdown() {
        let (start, end) = util::day_range(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
            &Tz::UTC,
        )
        .unwrap();
        let output = Selection::Range { start, end }
            .render(&sample(), false)
            .unwrap();
        assert!(output.starts_with("# Jan 15, 2024 → Jan 16, 2024\n"));
        assert!(output.contains("> **Range Total:** 3h\n"));
    }
}
