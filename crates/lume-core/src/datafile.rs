//! Timewarrior data directory parsing.
//!
//! Each `*.data` file holds one interval per line:
//!
//! ```text
//! inc 20240105T090000Z - 20240105T100000Z # "desc:write report" dev focus
//! ```
//!
//! Lines that do not match are skipped; only I/O failures abort ingestion.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono_tz::Tz;
use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;

use crate::entry::{Annotation, Entry, parse_timestamp};

/// Buffer size for `BufReader` (64KB, data files are append-only logs).
const BUFFER_SIZE: usize = 64 * 1024;

/// Closed interval line: start, end, annotation.
static INTERVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^inc (\d{8}T\d{6}Z) - (\d{8}T\d{6}Z) # (.*)$").unwrap()
});

/// Housekeeping files timewarrior keeps next to the interval data.
const EXCLUDED_MARKERS: &[&str] = &["undo", "tags"];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to list data directory {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read data file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parses every interval file in a timewarrior data directory.
///
/// Files are parsed in parallel; results are concatenated in file-name order
/// once every file has been read.
pub fn parse_data_dir(dir: &Path, tz: &Tz) -> Result<Vec<Entry>, IngestError> {
    let files = data_files(dir)?;
    tracing::debug!(dir = ?dir, files = files.len(), "scanning timewarrior data");

    let per_file: Vec<Vec<Entry>> = files
        .par_iter()
        .map(|path| parse_file(path, tz))
        .collect::<Result<Vec<_>, IngestError>>()?;

    let entries: Vec<Entry> = per_file.into_iter().flatten().collect();
    tracing::debug!(entries = entries.len(), "parsed timewarrior data");
    Ok(entries)
}

/// Lists `*.data` files, skipping undo and tag databases, sorted by name.
fn data_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let list_err = |source| IngestError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".data") || EXCLUDED_MARKERS.iter().any(|m| name.contains(m)) {
            continue;
        }
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parses a single data file.
pub fn parse_file(path: &Path, tz: &Tz) -> Result<Vec<Entry>, IngestError> {
    let read_err = |source| IngestError::ReadFile {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    let reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut entries = Vec::new();
    for line in reader.split(b'\n') {
        let line = line.map_err(read_err)?;
        let line = String::from_utf8_lossy(&line);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        match parse_line(line, tz) {
            Some(entry) => entries.push(entry),
            None => tracing::trace!(path = ?path, line, "skipping non-interval line"),
        }
    }
    Ok(entries)
}

/// Parses one `inc ... - ... # ...` line, or `None` if it is not a closed interval.
pub fn parse_line(line: &str, tz: &Tz) -> Option<Entry> {
    let caps = INTERVAL_RE.captures(line)?;
    let start = parse_timestamp(&caps[1], tz)?;
    let end = parse_timestamp(&caps[2], tz)?;
    parse_annotation(&caps[3]).into_entry(start, end).ok()
}

/// Splits an annotation into description and tags.
///
/// A quoted `"desc:..."` token keeps its inner spaces; empty tokens and
/// tokens starting with `#` are discarded.
pub(crate) fn parse_annotation(annotation: &str) -> Annotation {
    let mut parsed = Annotation::default();
    for token in split_annotation(annotation) {
        let token = token.trim();
        if let Some(quoted) = token.strip_prefix("\"desc:") {
            parsed.set_description(quoted.strip_suffix('"').unwrap_or(quoted));
        } else if !token.is_empty() && !token.starts_with('#') {
            parsed.push(token);
        }
    }
    parsed
}

/// Splits on spaces outside double quotes; quotes stay in the token.
fn split_annotation(annotation: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in annotation.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use tempfile::TempDir;

    #[test]
    fn test_parse_line_with_quoted_description() {
        let entry = parse_line(
            r#"inc 20240105T090000Z - 20240105T100000Z # "desc:write spec" dev focus"#,
            &Tz::UTC,
        )
        .unwrap();

        assert_eq!(entry.description(), "write spec");
        assert_eq!(
            entry.tags().iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["dev", "focus"]
        );
        assert_eq!(entry.duration_ms(), 3_600_000);
        assert_eq!(entry.start().day(), 5);
        assert_eq!(entry.start().hour(), 9);
    }

    #[test]
    fn test_parse_line_bare_description_keeps_escapes() {
        let entry = parse_line(
            r"inc 20240105T090000Z - 20240105T093000Z # desc:fix\ bug dev",
            &Tz::UTC,
        )
        .unwrap();
        assert_eq!(entry.description(), r"fix\");
        assert!(entry.tags().contains("bug"));
        assert!(entry.tags().contains("dev"));
    }

    #[test]
    fn test_parse_line_last_description_wins() {
        let entry = parse_line(
            r#"inc 20240105T090000Z - 20240105T093000Z # "desc:first" desc:second"#,
            &Tz::UTC,
        )
        .unwrap();
        assert_eq!(entry.description(), "second");
        assert!(entry.tags().is_empty());
    }

    #[test]
    fn test_parse_line_discards_hash_tokens() {
        let entry = parse_line(
            "inc 20240105T090000Z - 20240105T093000Z # #annotation dev",
            &Tz::UTC,
        )
        .unwrap();
        assert_eq!(entry.description(), "");
        assert_eq!(entry.tags().len(), 1);
        assert!(entry.tags().contains("dev"));
    }

    #[test]
    fn test_parse_line_empty_annotation() {
        let entry = parse_line("inc 20240105T090000Z - 20240105T093000Z # ", &Tz::UTC).unwrap();
        assert_eq!(entry.description(), "");
        assert!(entry.tags().is_empty());
    }

    #[test]
    fn test_parse_line_rejects_non_intervals() {
        for line in [
            "",
            "inc 20240105T090000Z # dev",
            "inc 20240105T090000Z - 20240105T100000Z",
            "inc 20241305T090000Z - 20240105T100000Z # dev",
            "inc 2024010XT090000Z - 20240105T100000Z # dev",
            "inc 20240105T100000Z - 20240105T090000Z # dev",
        ] {
            assert!(parse_line(line, &Tz::UTC).is_none(), "{line:?} should be skipped");
        }
    }

    #[test]
    fn test_split_annotation_preserves_quoted_spaces() {
        assert_eq!(
            split_annotation(r#""desc:a b  c"  tag  "x y""#),
            vec![r#""desc:a b  c""#, "tag", r#""x y""#]
        );
    }

    #[test]
    fn test_parse_data_dir_skips_malformed_lines() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("2024-01.data"),
            "inc 20240105T090000Z - 20240105T100000Z # \"desc:good\" dev\n\
             inc 20240105T1X0000Z - 20240105T110000Z # \"desc:bad\" dev\n",
        )
        .unwrap();

        let entries = parse_data_dir(temp.path(), &Tz::UTC).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description(), "good");
    }

    #[test]
    fn test_parse_data_dir_excludes_housekeeping_files() {
        let temp = TempDir::new().unwrap();
        let line = "inc 20240105T090000Z - 20240105T100000Z # dev\n";
        fs::write(temp.path().join("2024-01.data"), line).unwrap();
        fs::write(temp.path().join("undo.data"), line).unwrap();
        fs::write(temp.path().join("tags.data"), line).unwrap();
        fs::write(temp.path().join("notes.txt"), line).unwrap();

        let entries = parse_data_dir(temp.path(), &Tz::UTC).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_parse_data_dir_concatenates_in_name_order() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("2024-02.data"),
            "inc 20240205T090000Z - 20240205T100000Z # desc:feb\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("2024-01.data"),
            "inc 20240105T090000Z - 20240105T100000Z # desc:jan\r\n",
        )
        .unwrap();

        let entries = parse_data_dir(temp.path(), &Tz::UTC).unwrap();
        let descriptions: Vec<_> = entries.iter().map(Entry::description).collect();
        assert_eq!(descriptions, vec!["jan", "feb"]);
    }

    #[test]
    fn test_parse_data_dir_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = parse_data_dir(&missing, &Tz::UTC).unwrap_err();
        assert!(matches!(err, IngestError::ListDir { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_parse_data_dir_empty_directory() {
        let temp = TempDir::new().unwrap();
        assert!(parse_data_dir(temp.path(), &Tz::UTC).unwrap().is_empty());
    }
}
