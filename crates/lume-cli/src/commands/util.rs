//! Shared utilities for CLI commands.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use lume_core::Entry;

/// Parses a `YYYY-MM-DD` day selector.
pub fn parse_day(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {s}. Use YYYY-MM-DD (e.g., 2024-01-15)"))
}

/// Parses a `YYYY-MM` month selector into `(year, month)`.
pub fn parse_month(s: &str) -> anyhow::Result<(i32, u32)> {
    use chrono::Datelike;

    let first = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .with_context(|| format!("Invalid month: {s}. Use YYYY-MM (e.g., 2024-01)"))?;
    Ok((first.year(), first.month()))
}

/// Current local date in the observer zone.
pub fn today(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

/// Start of a local day.
///
/// Ambiguous midnights (DST fall-back) resolve to the earlier instant; a
/// midnight skipped by a DST gap resolves to the first hour that exists.
pub fn local_midnight(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=3)
        .find_map(|h| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(h)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Half-open window covering the inclusive day range `from..=to`.
pub fn day_range(
    from: NaiveDate,
    to: NaiveDate,
    tz: &Tz,
) -> anyhow::Result<(DateTime<Tz>, DateTime<Tz>)> {
    if to < from {
        anyhow::bail!("Invalid range: --to {to} is before --from {from}");
    }
    let after = to
        .succ_opt()
        .with_context(|| format!("date out of range: {to}"))?;
    Ok((local_midnight(from, tz), local_midnight(after, tz)))
}

/// Reads every interval from a timewarrior data directory.
pub fn load_entries(data_dir: &Path, tz: &Tz) -> anyhow::Result<Vec<Entry>> {
    tracing::debug!(dir = %data_dir.display(), "loading timewarrior data");
    let entries = lume_core::parse_data_dir(data_dir, tz)
        .with_context(|| format!("failed to read timewarrior data from {}", data_dir.display()))?;
    tracing::debug!(count = entries.len(), "loaded entries");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::{Havana, New_York};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("2024-02-29").unwrap(), date(2024, 2, 29));
        assert!(parse_day("2023-02-29").is_err());
        assert!(parse_day("15/01/2024").is_err());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-03").unwrap(), (2024, 3));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024-03-01").is_err());
    }

    #[test]
    fn test_local_midnight_new_york() {
        let start = local_midnight(date(2024, 1, 15), &New_York);
        assert_eq!(start.with_timezone(&Utc).hour(), 5);
        assert_eq!(start.date_naive(), date(2024, 1, 15));
    }

    #[test]
    fn test_local_midnight_in_dst_gap() {
        // Havana springs forward at midnight.
        let start = local_midnight(date(2024, 3, 10), &Havana);
        assert_eq!(start.date_naive(), date(2024, 3, 10));
        assert_eq!(start.hour(), 1);
    }

    #[test]
    fn test_day_range_is_inclusive() {
        let (start, end) = day_range(date(2024, 1, 1), date(2024, 1, 10), &Tz::UTC).unwrap();
        assert_eq!(start.date_naive(), date(2024, 1, 1));
        assert_eq!(end.date_naive(), date(2024, 1, 11));
    }

    #[test]
    fn test_day_range_rejects_inverted() {
        assert!(day_range(date(2024, 1, 10), date(2024, 1, 1), &Tz::UTC).is_err());
        assert!(day_range(date(2024, 1, 1), date(2024, 1, 1), &Tz::UTC).is_ok());
    }
}
