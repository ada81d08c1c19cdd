//! Period keys.
//!
//! This module contains the canonical period axis:
//! - [`PeriodKey`] - One of the twelve month codes, totally ordered
//! - [`ColumnKey`] - A report column bucket (a month, or a positional fallback)

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;

// ============================================================================
// Period Key
// ============================================================================

/// Canonical month code.
///
/// The derived `Ord` follows calendar order, so a `BTreeMap<PeriodKey, _>`
/// iterates `Jan..Dec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeriodKey {
    /// January
    Jan,
    /// February
    Feb,
    /// March
    Mar,
    /// April
    Apr,
    /// May
    May,
    /// June
    Jun,
    /// July
    Jul,
    /// August
    Aug,
    /// September
    Sep,
    /// October
    Oct,
    /// November
    Nov,
    /// December
    Dec,
}

impl PeriodKey {
    /// All twelve keys in calendar order.
    pub const ALL: [PeriodKey; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    /// Returns the three-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Jan => "Jan",
            Self::Feb => "Feb",
            Self::Mar => "Mar",
            Self::Apr => "Apr",
            Self::May => "May",
            Self::Jun => "Jun",
            Self::Jul => "Jul",
            Self::Aug => "Aug",
            Self::Sep => "Sep",
            Self::Oct => "Oct",
            Self::Nov => "Nov",
            Self::Dec => "Dec",
        }
    }

    /// Returns the calendar month number (1-12).
    pub fn month(self) -> u32 {
        self as u32 + 1
    }

    /// Maps a calendar month number (1-12) to its key.
    pub fn from_month(month: u32) -> Option<Self> {
        let index = usize::try_from(month.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Matches a three-letter code, ignoring case.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.code().eq_ignore_ascii_case(code))
    }

    /// Returns a twelve-slot map with every value set to zero.
    pub fn zeroed() -> BTreeMap<PeriodKey, f64> {
        Self::ALL.iter().map(|k| (*k, 0.0)).collect()
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PeriodKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u32>() {
            return Self::from_month(n)
                .ok_or_else(|| CoreError::InvalidData(format!("month out of range: {n}")));
        }
        Self::from_code(trimmed)
            .ok_or_else(|| CoreError::InvalidData(format!("unknown month: {trimmed:?}")))
    }
}

// ============================================================================
// Column Key
// ============================================================================

/// Bucket for one report column.
///
/// Columns whose title names a month map to that month; anything else keeps
/// a unique positional key (`M1`, `M2`, ...) so it still gets its own bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    /// A recognized month.
    Period(PeriodKey),
    /// 1-based column position among the period columns.
    Positional(usize),
}

impl ColumnKey {
    /// Returns the month, if this column maps to one.
    pub fn period(self) -> Option<PeriodKey> {
        match self {
            Self::Period(key) => Some(key),
            Self::Positional(_) => None,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Period(key) => write!(f, "{key}"),
            Self::Positional(n) => write!(f, "M{n}"),
        }
    }
}

impl Serialize for ColumnKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<PeriodKey> for ColumnKey {
    fn from(key: PeriodKey) -> Self {
        Self::Period(key)
    }
}
