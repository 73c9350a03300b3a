//! Markdown rendering for aggregated reports.
//!
//! Every renderer writes into a `String` through [`std::fmt::Write`] and
//! hands back the document; the caller decides whether it goes to stdout or
//! to a report file.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use chrono::{NaiveDate, TimeDelta, Weekday};
use lume_core::{
    Category, DayReport, MonthData, RangeReport, TaskSummary, UNTAGGED, WeekData, YearReport,
    categorize,
};

const BAR_WIDTH: i64 = 20;
const MAX_TASK_WIDTH: usize = 55;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ========== Formatting Helpers ==========

/// Formats milliseconds as "Xh Ym", "Xh" or "Ym", floored to whole minutes.
/// Negative durations render as "0m".
pub fn format_duration(ms: i64) -> String {
    let total_minutes = ms.max(0) / 60_000;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Generates a 20-cell bar filled in proportion to `value / max`.
pub fn progress_bar(value: i64, max: i64) -> String {
    let filled = if max > 0 {
        (value.max(0).saturating_mul(BAR_WIDTH) / max).min(BAR_WIDTH)
    } else {
        0
    };
    let filled = usize::try_from(filled).unwrap_or(0);
    let empty = usize::try_from(BAR_WIDTH).unwrap_or(0) - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Escapes table pipes and shortens long descriptions with "...".
pub fn truncate(description: &str) -> String {
    let escaped = description.replace('|', "\\|");
    if escaped.chars().count() <= MAX_TASK_WIDTH {
        return escaped;
    }
    let mut short: String = escaped.chars().take(MAX_TASK_WIDTH - 3).collect();
    short.push_str("...");
    short
}

/// English month name for 1..=12.
pub fn month_name(month: u32) -> &'static str {
    usize::try_from(month)
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|i| MONTH_NAMES.get(i))
        .copied()
        .unwrap_or("Unknown")
}

/// File name of a month page inside a year directory, e.g. `03-march.md`.
pub fn month_file_name(month: u32) -> String {
    format!("{month:02}-{}.md", month_name(month).to_lowercase())
}

fn percent(ms: i64, total_ms: i64) -> f64 {
    if total_ms <= 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = ms as f64 / total_ms as f64;
    ratio * 100.0
}

fn week_span(week: &WeekData) -> String {
    format!(
        "{} → {}",
        week.start.format("%a, %b %-d"),
        week.end.format("%a, %b %-d")
    )
}

// ========== Shared Sections ==========

/// One line per tag, longest first, with a bar relative to the longest tag.
fn write_tag_summary(
    out: &mut String,
    tags: &BTreeMap<String, i64>,
    total_ms: i64,
) -> fmt::Result {
    let mut sorted: Vec<(&String, i64)> = tags.iter().map(|(t, ms)| (t, *ms)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let max = sorted.first().map_or(0, |(_, ms)| *ms);

    for (tag, ms) in sorted {
        writeln!(
            out,
            "`{tag}` {} **{}** ({:.0}%)\n",
            progress_bar(ms, max),
            format_duration(ms),
            percent(ms, total_ms)
        )?;
    }
    Ok(())
}

fn write_overview(
    out: &mut String,
    heading: &str,
    tags: &BTreeMap<String, i64>,
    total_ms: i64,
) -> fmt::Result {
    if tags.is_empty() {
        return Ok(());
    }
    writeln!(out, "{heading}\n")?;
    write_tag_summary(out, tags, total_ms)?;
    writeln!(out, "---\n")
}

fn write_category_table(
    out: &mut String,
    category: Category,
    tasks: &[&TaskSummary],
) -> fmt::Result {
    writeln!(out, "## {}\n", category.title())?;
    if tasks.is_empty() {
        return writeln!(out, "No entries found.\n");
    }

    writeln!(out, "| # | Task | Time | Sessions |")?;
    writeln!(out, "|--:|:-----|-----:|---------:|")?;
    for (i, task) in tasks.iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            i + 1,
            truncate(&task.description),
            format_duration(task.total_ms),
            task.sessions
        )?;
    }
    writeln!(out)
}

fn write_category_week_table(
    out: &mut String,
    category: Category,
    tasks: &[&TaskSummary],
) -> fmt::Result {
    writeln!(out, "## {}\n", category.title())?;
    if tasks.is_empty() {
        return writeln!(out, "No entries found.\n");
    }

    writeln!(out, "| # | Task | Time | Mon | Tue | Wed | Thu | Fri | Sat | Sun |")?;
    writeln!(out, "|--:|:-----|-----:|----:|----:|----:|----:|----:|----:|----:|")?;
    for (i, task) in tasks.iter().enumerate() {
        write!(
            out,
            "| {} | {} | {} |",
            i + 1,
            truncate(&task.description),
            format_duration(task.total_ms)
        )?;
        for day in WEEKDAYS {
            let ms = task.day_totals.map_or(0, |totals| totals.get(day));
            if ms > 0 {
                write!(out, " {} |", format_duration(ms))?;
            } else {
                write!(out, "  |")?;
            }
        }
        writeln!(out)?;
    }
    writeln!(out)
}

/// Groups a week's tasks under each of their tags; untagged tasks go under
/// `untagged`. Groups are ordered by subtotal, longest first.
fn tasks_by_tag(tasks: &[TaskSummary]) -> Vec<(&str, i64, Vec<&TaskSummary>)> {
    let mut grouped: BTreeMap<&str, Vec<&TaskSummary>> = BTreeMap::new();
    for task in tasks {
        if task.tags.is_empty() {
            grouped.entry(UNTAGGED).or_default().push(task);
        } else {
            for tag in &task.tags {
                grouped.entry(tag.as_str()).or_default().push(task);
            }
        }
    }

    let mut groups: Vec<(&str, i64, Vec<&TaskSummary>)> = grouped
        .into_iter()
        .map(|(tag, mut tasks)| {
            tasks.sort_by(|a, b| TaskSummary::cmp_by_time(a, b));
            let subtotal: i64 = tasks.iter().map(|t| t.total_ms).sum();
            (tag, subtotal, tasks)
        })
        .collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    groups
}

fn write_week_section(out: &mut String, week: &WeekData) -> fmt::Result {
    writeln!(out, "## Week {}", week.week_number)?;
    writeln!(out, "> {}\n", week_span(week))?;
    writeln!(out, "**Total:** {}\n", format_duration(week.total_ms))?;

    if !week.by_tag.is_empty() {
        write_tag_summary(out, &week.by_tag, week.total_ms)?;
    }

    for (tag, subtotal, tasks) in tasks_by_tag(&week.tasks) {
        writeln!(out, "### {tag}")?;
        writeln!(out, "**Subtotal:** {}\n", format_duration(subtotal))?;
        writeln!(out, "| # | Task | Time | Sessions |")?;
        writeln!(out, "|--:|:-----|-----:|---------:|")?;
        for (i, task) in tasks.iter().enumerate() {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                i + 1,
                truncate(&task.description),
                format_duration(task.total_ms),
                task.sessions
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "---\n")
}

// ========== Reports ==========

/// Day report: tag overview, then one table per category.
pub fn render_day(report: &DayReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# {}\n", report.date.format("%A, %b %-d, %Y"))?;
    writeln!(out, "> **Daily Total:** {}\n", format_duration(report.total_ms))?;
    write_overview(&mut out, "## Overview", &report.by_tag, report.total_ms)?;

    if report.tasks.is_empty() {
        writeln!(out, "No entries found for this day.")?;
        return Ok(out);
    }

    let categorized = categorize(&report.tasks);
    for (category, tasks) in categorized.iter() {
        write_category_table(&mut out, category, tasks)?;
    }
    Ok(out)
}

/// Week report: tag overview, then per-category tables with weekday columns.
pub fn render_week(week: &WeekData) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# Week {}", week.week_number)?;
    writeln!(out, "> {}\n", week_span(week))?;
    writeln!(out, "**Total:** {}\n", format_duration(week.total_ms))?;
    write_overview(&mut out, "## Overview", &week.by_tag, week.total_ms)?;

    if week.tasks.is_empty() {
        writeln!(out, "No entries found for this week.")?;
        return Ok(out);
    }

    let categorized = categorize(&week.tasks);
    for (category, tasks) in categorized.iter() {
        write_category_week_table(&mut out, category, tasks)?;
    }
    Ok(out)
}

/// Month page, used both for `report month` and the generated month files.
pub fn render_month(month: &MonthData, year: i32) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# {} {year}\n", month_name(month.month))?;
    writeln!(out, "> **Monthly Total:** {}\n", format_duration(month.total_ms))?;
    writeln!(out, "---\n")?;
    write_overview(&mut out, "## Overview", &month.tag_totals(), month.total_ms)?;

    if month.weeks.is_empty() {
        writeln!(out, "No entries found for this month.")?;
        return Ok(out);
    }

    for week in &month.weeks {
        write_week_section(&mut out, week)?;
    }
    Ok(out)
}

/// Range report; the title shows the last day that falls inside the window.
pub fn render_range(report: &RangeReport) -> Result<String, fmt::Error> {
    let first = report.start.date_naive();
    let last: NaiveDate = if report.end > report.start {
        (report.end - TimeDelta::milliseconds(1)).date_naive()
    } else {
        first
    };

    let mut out = String::new();
    writeln!(
        out,
        "# {} → {}\n",
        first.format("%b %-d, %Y"),
        last.format("%b %-d, %Y")
    )?;
    writeln!(out, "> **Range Total:** {}\n", format_duration(report.total_ms))?;
    writeln!(out, "---\n")?;
    write_overview(&mut out, "## Overview", &report.tag_totals(), report.total_ms)?;

    if report.weeks.is_empty() {
        writeln!(out, "No entries found for this range.")?;
        return Ok(out);
    }

    for week in &report.weeks {
        write_week_section(&mut out, week)?;
    }
    Ok(out)
}

/// Year `index.md`: totals, year overview and links to the month pages.
pub fn render_year_index(report: &YearReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# Time Report {}\n", report.year)?;
    writeln!(out, "> **Total Tracked:** {}\n", format_duration(report.total_ms))?;
    write_overview(&mut out, "## Year Overview", &report.tag_totals(), report.total_ms)?;

    writeln!(out, "## Months\n")?;
    for month in &report.months {
        writeln!(
            out,
            "- [{}]({}): {}",
            month_name(month.month),
            month_file_name(month.month),
            format_duration(month.total_ms)
        )?;
    }
    Ok(out)
}
