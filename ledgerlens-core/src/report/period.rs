//! Mapping column titles and transaction dates onto period keys.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::models::{ColumnKey, PeriodKey};

/// Separators that end the leading token of a column title.
const TITLE_SEPARATORS: &[char] = &['-', ' ', '/', '.', ','];

/// Maps a column title such as `Jan-2025`, `Jan 2025`, or `January` to its
/// month.
///
/// Takes the leading token before a separator and compares its first three
/// characters against the canonical codes. Titles that do not name a month
/// (`Total`, empty titles, non-English month names) fall back to a positional
/// key built from `index` (0-based), so every column keeps its own bucket.
pub fn from_column_title(title: &str, index: usize) -> ColumnKey {
    let token = title
        .trim()
        .split(TITLE_SEPARATORS)
        .next()
        .unwrap_or_default();
    let short: String = token.chars().take(3).collect();

    match PeriodKey::from_code(&short) {
        Some(key) if short.len() == 3 => ColumnKey::Period(key),
        _ => ColumnKey::Positional(index + 1),
    }
}

/// Maps a transaction date string to its month.
///
/// Tries ISO-8601 (`2024-03-15`, `2024-03-15T10:00:00Z`,
/// `2024-03-15T10:00:00`) and then the US locale forms `03/15/2024` and
/// `03/15/24`. Returns `None` when nothing parses; the caller drops that
/// contribution.
pub fn from_date_string(s: &str) -> Option<PeriodKey> {
    parse_date(s).and_then(|d| PeriodKey::from_month(d.month()))
}

/// Parses a date with the same format list as [`from_date_string`].
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    ["%m/%d/%Y", "%m/%d/%y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
