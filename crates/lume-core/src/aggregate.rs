//! Bucketing of entries into day, week, month, year and range reports.
//!
//! Weeks follow ISO-8601 everywhere: they start on Monday in the observer's
//! zone and are numbered with the ISO week of that Monday. Every window is
//! half-open and an entry belongs to the window containing its start.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Days, NaiveDate};
use chrono_tz::Tz;
use thiserror::Error;

use crate::entry::Entry;
use crate::report::{
    DayReport, DayTotals, MonthData, RangeReport, TaskSummary, WeekData, YearReport,
};

/// Label for tasks whose entries carry no description.
pub const NO_DESCRIPTION: &str = "(no description)";

/// Tag bucket for entries without any tag.
pub const UNTAGGED: &str = "untagged";

/// Rejected period selectors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("range end {end} is before its start {start}")]
    InvertedRange {
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    },
    #[error("invalid month: {0}")]
    InvalidMonth(u32),
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Local calendar date an entry is bucketed under.
fn start_date(entry: &Entry) -> NaiveDate {
    entry.start().date_naive()
}

/// Report for a single local day.
pub fn day_report(entries: &[Entry], date: NaiveDate) -> DayReport {
    let day: Vec<&Entry> = entries.iter().filter(|e| start_date(e) == date).collect();

    DayReport {
        date,
        tasks: summarize_tasks(&day, false),
        by_tag: tag_totals(&day),
        total_ms: total_ms(&day),
    }
}

/// Report for the week containing `date`, with per-weekday task totals.
pub fn week_report(entries: &[Entry], date: NaiveDate) -> WeekData {
    let start = week_start(date);
    let week: Vec<&Entry> = entries
        .iter()
        .filter(|e| week_start(start_date(e)) == start)
        .collect();
    build_week(start, &week)
}

/// Report for one calendar month.
pub fn month_report(entries: &[Entry], year: i32, month: u32) -> Result<MonthData, PeriodError> {
    if !(1..=12).contains(&month) {
        return Err(PeriodError::InvalidMonth(month));
    }
    let selected: Vec<&Entry> = entries
        .iter()
        .filter(|e| e.start().year() == year && e.start().month() == month)
        .collect();
    Ok(build_month(month, &selected))
}

/// Report for one calendar year.
pub fn year_report(entries: &[Entry], year: i32) -> YearReport {
    let selected: Vec<&Entry> = entries.iter().filter(|e| e.start().year() == year).collect();
    build_year(year, &selected)
}

/// One report per year present in `entries`, ascending.
pub fn year_reports(entries: &[Entry]) -> Vec<YearReport> {
    let mut by_year: BTreeMap<i32, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        by_year.entry(entry.start().year()).or_default().push(entry);
    }
    by_year
        .into_iter()
        .map(|(year, selected)| build_year(year, &selected))
        .collect()
}

/// Report for the half-open window `[start, end)`.
pub fn range_report(
    entries: &[Entry],
    start: DateTime<Tz>,
    end: DateTime<Tz>,
) -> Result<RangeReport, PeriodError> {
    if end < start {
        return Err(PeriodError::InvertedRange { start, end });
    }
    let selected: Vec<&Entry> = entries
        .iter()
        .filter(|e| *e.start() >= start && *e.start() < end)
        .collect();
    let weeks = group_by_week(&selected);
    let total_ms = weeks.iter().map(|w| w.total_ms).sum();

    Ok(RangeReport {
        start,
        end,
        weeks,
        total_ms,
    })
}

fn build_year(year: i32, entries: &[&Entry]) -> YearReport {
    let mut by_month: BTreeMap<u32, Vec<&Entry>> = BTreeMap::new();
    for &entry in entries {
        by_month.entry(entry.start().month()).or_default().push(entry);
    }

    let months: Vec<MonthData> = by_month
        .into_iter()
        .map(|(month, selected)| build_month(month, &selected))
        .collect();
    let total_ms = months.iter().map(|m| m.total_ms).sum();

    YearReport {
        year,
        months,
        total_ms,
    }
}

fn build_month(month: u32, entries: &[&Entry]) -> MonthData {
    let weeks = group_by_week(entries);
    let total_ms = weeks.iter().map(|w| w.total_ms).sum();
    MonthData {
        month,
        weeks,
        total_ms,
    }
}

/// Groups entries by the week they start in, ascending by week start.
fn group_by_week(entries: &[&Entry]) -> Vec<WeekData> {
    let mut by_week: BTreeMap<NaiveDate, Vec<&Entry>> = BTreeMap::new();
    for &entry in entries {
        by_week
            .entry(week_start(start_date(entry)))
            .or_default()
            .push(entry);
    }
    by_week
        .into_iter()
        .map(|(start, selected)| build_week(start, &selected))
        .collect()
}

fn build_week(start: NaiveDate, entries: &[&Entry]) -> WeekData {
    let iso = start.iso_week();
    WeekData {
        iso_year: iso.year(),
        week_number: iso.week(),
        start,
        end: start + Days::new(6),
        tasks: summarize_tasks(entries, true),
        by_tag: tag_totals(entries),
        total_ms: total_ms(entries),
    }
}

fn total_ms(entries: &[&Entry]) -> i64 {
    entries.iter().map(|e| e.duration_ms()).sum()
}

/// Groups entries by description, longest task first.
fn summarize_tasks(entries: &[&Entry], with_day_totals: bool) -> Vec<TaskSummary> {
    let mut by_description: BTreeMap<&str, TaskSummary> = BTreeMap::new();

    for entry in entries {
        let description = match entry.description() {
            "" => NO_DESCRIPTION,
            other => other,
        };
        let task = by_description
            .entry(description)
            .or_insert_with(|| TaskSummary {
                description: description.to_string(),
                total_ms: 0,
                sessions: 0,
                tags: BTreeSet::new(),
                day_totals: with_day_totals.then(DayTotals::default),
            });

        let ms = entry.duration_ms();
        task.total_ms += ms;
        task.sessions += 1;
        task.tags.extend(entry.tags().iter().cloned());
        if let Some(days) = task.day_totals.as_mut() {
            days.add(entry.start().weekday(), ms);
        }
    }

    let mut tasks: Vec<TaskSummary> = by_description.into_values().collect();
    tasks.sort_by(TaskSummary::cmp_by_time);
    tasks
}

/// Adds each entry's duration to every tag it carries.
///
/// Multi-tag entries count towards each of their tags, so the tag totals may
/// exceed the period total.
fn tag_totals(entries: &[&Entry]) -> BTreeMap<String, i64> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for entry in entries {
        let ms = entry.duration_ms();
        if entry.tags().is_empty() {
            *totals.entry(UNTAGGED.to_string()).or_insert(0) += ms;
        }
        for tag in entry.tags() {
            *totals.entry(tag.clone()).or_insert(0) += ms;
        }
    }
    totals
}
