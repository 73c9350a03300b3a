//! Tracked intervals and the decoding rules shared by both input formats.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

/// Timestamp layout used by timewarrior, always in UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Length of a `YYYYMMDDTHHMMSSZ` timestamp.
const TIMESTAMP_LEN: usize = 16;

/// Tag prefix that carries the task description.
const DESC_PREFIX: &str = "desc:";

/// Errors raised when constructing an [`Entry`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The interval would have a negative duration.
    #[error("interval ends at {end} before it starts at {start}")]
    EndBeforeStart {
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    },
}

/// One tracked interval, expressed in the observer's time zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    description: String,
    tags: BTreeSet<String>,
}

impl Entry {
    /// Creates an entry, rejecting intervals that end before they start.
    pub fn new(
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        description: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, EntryError> {
        if end < start {
            return Err(EntryError::EndBeforeStart { start, end });
        }
        Ok(Self {
            start,
            end,
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        })
    }

    pub const fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    pub const fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    /// Free-text description; empty when the interval carried none.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Duration in whole milliseconds.
    pub fn duration_ms(&self) -> i64 {
        self.duration().num_milliseconds()
    }
}

/// Parses a `YYYYMMDDTHHMMSSZ` UTC timestamp into the observer's zone.
///
/// Returns `None` for anything that is not exactly that shape.
pub fn parse_timestamp(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if raw.len() != TIMESTAMP_LEN || !raw.is_ascii() {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()?;
    Some(tz.from_utc_datetime(&naive))
}

/// Description and tags accumulated from a sequence of annotation tokens.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Annotation {
    pub(crate) description: String,
    pub(crate) tags: BTreeSet<String>,
}

impl Annotation {
    /// Classifies one token: a `desc:` prefix supplies the description
    /// (last one wins), anything else is kept verbatim as a tag.
    pub(crate) fn push(&mut self, token: &str) {
        if let Some(description) = token.strip_prefix(DESC_PREFIX) {
            self.description = description.to_string();
        } else {
            self.tags.insert(token.to_string());
        }
    }

    pub(crate) fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub(crate) fn into_entry(
        self,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Entry, EntryError> {
        Entry::new(start, end, self.description, self.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::New_York;

    #[test]
    fn parse_timestamp_utc() {
        let ts = parse_timestamp("20240105T090000Z", &Tz::UTC).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-05T09:00:00+00:00");
    }

    #[test]
    fn parse_timestamp_converts_to_observer_zone() {
        let ts = parse_timestamp("20240105T090000Z", &New_York).unwrap();
        assert_eq!(ts.hour(), 4);
        assert_eq!(ts.to_rfc3339(), "2024-01-05T04:00:00-05:00");
    }

    #[test]
    fn parse_timestamp_rejects_malformed() {
        assert!(parse_timestamp("", &Tz::UTC).is_none());
        assert!(parse_timestamp("20240105T090000", &Tz::UTC).is_none());
        assert!(parse_timestamp("20241305T090000Z", &Tz::UTC).is_none());
        assert!(parse_timestamp("2024-01-05T09:00Z", &Tz::UTC).is_none());
        assert!(parse_timestamp("20240105T096000Z", &Tz::UTC).is_none());
    }

    #[test]
    fn entry_rejects_negative_duration() {
        let start = parse_timestamp("20240105T100000Z", &Tz::UTC).unwrap();
        let end = parse_timestamp("20240105T090000Z", &Tz::UTC).unwrap();
        let err = Entry::new(start, end, "", Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, EntryError::EndBeforeStart { .. }));
    }

    #[test]
    fn entry_allows_zero_duration() {
        let start = parse_timestamp("20240105T100000Z", &Tz::UTC).unwrap();
        let entry = Entry::new(start, start, "standup", ["meetings"]).unwrap();
        assert_eq!(entry.duration_ms(), 0);
        assert!(entry.tags().contains("meetings"));
    }

    #[test]
    fn annotation_last_description_wins() {
        let mut annotation = Annotation::default();
        for token in ["desc:first", "dev", "desc:second", "dev"] {
            annotation.push(token);
        }
        assert_eq!(annotation.description, "second");
        assert_eq!(annotation.tags.len(), 1);
        assert!(annotation.tags.contains("dev"));
    }
}
