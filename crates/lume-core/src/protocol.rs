//! Timewarrior extension protocol.
//!
//! Extensions receive a configuration block of `key: value` lines, a blank
//! line, and a JSON array of intervals on stdin.

use std::collections::BTreeMap;
use std::io::{self, BufRead};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::entry::{Annotation, Entry, parse_timestamp};

/// Report window start, set by `timew report`.
pub const REPORT_START_KEY: &str = "temp.report.start";
/// Report window end, set by `timew report`.
pub const REPORT_END_KEY: &str = "temp.report.end";
/// Comma-delimited tag filter passed on the `timew report` command line.
pub const REPORT_TAGS_KEY: &str = "temp.report.tags";
/// Timewarrior database directory.
pub const DATA_DIR_KEY: &str = "temp.db";
/// Output directory for generated reports.
pub const OUTPUT_DIR_KEY: &str = "reports.lume.output";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to read extension input: {0}")]
    Io(#[from] io::Error),
    #[error("malformed interval payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration block of the extension protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimewConfig {
    values: BTreeMap<String, String>,
}

impl TimewConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Start of the report window, if present and well-formed.
    pub fn report_start(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        self.timestamp(REPORT_START_KEY, tz)
    }

    /// End of the report window (exclusive), if present and well-formed.
    pub fn report_end(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        self.timestamp(REPORT_END_KEY, tz)
    }

    /// Whether `tag` appears in the report's tag filter.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.get(REPORT_TAGS_KEY)
            .is_some_and(|tags| tags.split(',').any(|t| t.trim() == tag))
    }

    fn timestamp(&self, key: &str, tz: &Tz) -> Option<DateTime<Tz>> {
        self.get(key).and_then(|raw| parse_timestamp(raw, tz))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TimewConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Decoded extension input.
#[derive(Debug, Clone, Default)]
pub struct ExtensionInput {
    pub config: TimewConfig,
    pub entries: Vec<Entry>,
}

/// One interval as serialized by `timew export`.
#[derive(Debug, Deserialize)]
struct TimewInterval {
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Reads the extension protocol.
///
/// `now` closes intervals that are still open. Intervals with malformed
/// timestamps are dropped; only an unreadable stream or a payload that is not
/// a JSON array of objects fails the call.
pub fn parse_extension_input<R: BufRead>(
    reader: R,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<ExtensionInput, ProtocolError> {
    let mut values = BTreeMap::new();
    let mut payload = String::new();
    let mut in_config = true;

    for line in reader.lines() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if in_config {
            if line.is_empty() {
                in_config = false;
            } else if let Some((key, value)) = line.split_once(": ") {
                values.insert(key.to_string(), value.to_string());
            }
        } else {
            payload.push_str(line);
            payload.push('\n');
        }
    }

    let config = TimewConfig { values };
    let payload = payload.trim();
    if payload.is_empty() || payload == "[]" {
        return Ok(ExtensionInput {
            config,
            entries: Vec::new(),
        });
    }

    let intervals: Vec<TimewInterval> = serde_json::from_str(payload)?;
    let now = now.with_timezone(tz);
    let entries: Vec<Entry> = intervals
        .into_iter()
        .filter_map(|interval| decode_interval(interval, tz, now))
        .collect();
    tracing::debug!(entries = entries.len(), "decoded extension intervals");

    Ok(ExtensionInput { config, entries })
}

fn decode_interval(interval: TimewInterval, tz: &Tz, now: DateTime<Tz>) -> Option<Entry> {
    let Some(start) = parse_timestamp(&interval.start, tz) else {
        tracing::trace!(start = %interval.start, "dropping interval with malformed start");
        return None;
    };
    let end = match interval.end.as_deref() {
        None | Some("") => now,
        Some(raw) => parse_timestamp(raw, tz)?,
    };

    let mut annotation = Annotation::default();
    for tag in interval.tags.iter().flatten() {
        annotation.push(tag);
    }
    annotation.into_entry(start, end).ok()
}
