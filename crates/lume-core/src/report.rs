//! Aggregated report structures handed to renderers.
//!
//! All durations are integer milliseconds so totals reconcile exactly across
//! every level of the hierarchy; use [`ms_to_hours`] for display.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Converts milliseconds to fractional hours.
#[allow(clippy::cast_precision_loss)]
pub fn ms_to_hours(ms: i64) -> f64 {
    ms as f64 / MS_PER_HOUR
}

/// Per-weekday time for a task, Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayTotals([i64; 7]);

impl DayTotals {
    pub fn get(&self, day: Weekday) -> i64 {
        self.0[day.num_days_from_monday() as usize]
    }

    pub fn add(&mut self, day: Weekday, ms: i64) {
        self.0[day.num_days_from_monday() as usize] += ms;
    }

    /// Weekdays in ISO order with their totals.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, i64)> + '_ {
        let mut day = Weekday::Mon;
        self.0.iter().map(move |&ms| {
            let current = day;
            day = day.succ();
            (current, ms)
        })
    }

    pub fn sum(&self) -> i64 {
        self.0.iter().sum()
    }
}

/// All entries sharing one description within a report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub description: String,
    pub total_ms: i64,
    pub sessions: usize,
    /// Union of the tags seen on contributing entries.
    pub tags: BTreeSet<String>,
    /// Only present on week-level summaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_totals: Option<DayTotals>,
}

impl TaskSummary {
    pub fn hours(&self) -> f64 {
        ms_to_hours(self.total_ms)
    }

    /// Longest first, then by description.
    pub fn cmp_by_time(a: &Self, b: &Self) -> Ordering {
        b.total_ms
            .cmp(&a.total_ms)
            .then_with(|| a.description.cmp(&b.description))
    }
}

/// One ISO-8601 week (Monday to Sunday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekData {
    /// ISO week-based year; differs from the calendar year around New Year.
    pub iso_year: i32,
    pub week_number: u32,
    /// Monday of the week.
    pub start: NaiveDate,
    /// Sunday of the week (inclusive).
    pub end: NaiveDate,
    pub tasks: Vec<TaskSummary>,
    pub by_tag: BTreeMap<String, i64>,
    pub total_ms: i64,
}

/// One calendar month, split into the weeks its entries fall in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthData {
    pub month: u32,
    pub weeks: Vec<WeekData>,
    pub total_ms: i64,
}

impl MonthData {
    pub fn tag_totals(&self) -> BTreeMap<String, i64> {
        merge_tag_totals(&self.weeks)
    }
}

/// An arbitrary half-open window `[start, end)`, split into weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeReport {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub weeks: Vec<WeekData>,
    pub total_ms: i64,
}

impl RangeReport {
    pub fn tag_totals(&self) -> BTreeMap<String, i64> {
        merge_tag_totals(&self.weeks)
    }
}

/// A calendar year; months without entries are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearReport {
    pub year: i32,
    pub months: Vec<MonthData>,
    pub total_ms: i64,
}

impl YearReport {
    pub fn tag_totals(&self) -> BTreeMap<String, i64> {
        let mut totals = BTreeMap::new();
        for month in &self.months {
            for (tag, ms) in month.tag_totals() {
                *totals.entry(tag).or_insert(0) += ms;
            }
        }
        totals
    }
}

/// A single local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub tasks: Vec<TaskSummary>,
    pub by_tag: BTreeMap<String, i64>,
    pub total_ms: i64,
}

/// Sums per-tag time across weeks.
pub fn merge_tag_totals(weeks: &[WeekData]) -> BTreeMap<String, i64> {
    let mut totals = BTreeMap::new();
    for week in weeks {
        for (tag, ms) in &week.by_tag {
            *totals.entry(tag.clone()).or_insert(0) += ms;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(description: &str, total_ms: i64) -> TaskSummary {
        TaskSummary {
            description: description.to_string(),
            total_ms,
            sessions: 1,
            tags: BTreeSet::new(),
            day_totals: None,
        }
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "exact binary fractions")]
    fn test_ms_to_hours() {
        assert_eq!(ms_to_hours(3_600_000), 1.0);
        assert_eq!(ms_to_hours(5_400_000), 1.5);
        assert_eq!(ms_to_hours(0), 0.0);
    }

    #[test]
    fn test_day_totals_iter_is_monday_first() {
        let mut totals = DayTotals::default();
        totals.add(Weekday::Sun, 10);
        totals.add(Weekday::Mon, 5);
        totals.add(Weekday::Mon, 5);

        let days: Vec<_> = totals.iter().collect();
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], (Weekday::Mon, 10));
        assert_eq!(days[6], (Weekday::Sun, 10));
        assert_eq!(totals.get(Weekday::Wed), 0);
        assert_eq!(totals.sum(), 20);
    }

    #[test]
    fn test_cmp_by_time_breaks_ties_by_description() {
        let mut tasks = vec![task("b", 10), task("a", 10), task("c", 20)];
        tasks.sort_by(TaskSummary::cmp_by_time);
        let order: Vec<_> = tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_merge_tag_totals() {
        let week = |tags: &[(&str, i64)]| WeekData {
            iso_year: 2024,
            week_number: 1,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            tasks: Vec::new(),
            by_tag: tags.iter().map(|(t, ms)| ((*t).to_string(), *ms)).collect(),
            total_ms: 0,
        };
        let merged = merge_tag_totals(&[week(&[("dev", 1), ("x", 2)]), week(&[("dev", 3)])]);
        assert_eq!(merged.get("dev"), Some(&4));
        assert_eq!(merged.get("x"), Some(&2));
    }
}
