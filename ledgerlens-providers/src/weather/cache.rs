//! Two-tier memo for monthly temperatures.
//!
//! - Fine tier: `(location, year, month) -> Option<f64>`; `None` records
//!   "upstream had no readings" so it is not asked again.
//! - Coarse tier: `(location, year) -> all 12 months`, written only after a
//!   full-year fan-out finished.
//!
//! Locations are trimmed and lowercased before use as keys.

use std::collections::{BTreeMap, HashMap};

use ledgerlens_core::PeriodKey;
use tokio::sync::RwLock;
use tracing::trace;

type MonthKey = (String, i32, PeriodKey);
type YearKey = (String, i32);

/// In-memory period cache. Owned by (or shared into) a
/// [`super::PeriodAggregator`]; nothing here is global.
#[derive(Debug, Default)]
pub struct PeriodCache {
    months: RwLock<HashMap<MonthKey, Option<f64>>>,
    years: RwLock<HashMap<YearKey, BTreeMap<PeriodKey, f64>>>,
}

impl PeriodCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up one month. The outer `Option` is hit/miss.
    pub async fn month(&self, location: &str, year: i32, month: PeriodKey) -> Option<Option<f64>> {
        let key = (normalize(location), year, month);
        let hit = self.months.read().await.get(&key).copied();
        trace!(location = %key.0, year, month = %month, hit = hit.is_some(), "Month cache lookup");
        hit
    }

    /// Records one month.
    pub async fn put_month(&self, location: &str, year: i32, month: PeriodKey, value: Option<f64>) {
        self.months
            .write()
            .await
            .insert((normalize(location), year, month), value);
    }

    /// Looks up a full year; the returned map is a copy.
    pub async fn year(&self, location: &str, year: i32) -> Option<BTreeMap<PeriodKey, f64>> {
        self.years
            .read()
            .await
            .get(&(normalize(location), year))
            .cloned()
    }

    /// Records a full year.
    pub async fn put_year(&self, location: &str, year: i32, values: BTreeMap<PeriodKey, f64>) {
        self.years
            .write()
            .await
            .insert((normalize(location), year), values);
    }

    /// Number of cached months and years.
    pub async fn len(&self) -> (usize, usize) {
        (self.months.read().await.len(), self.years.read().await.len())
    }

    /// Drops everything.
    pub async fn clear(&self) {
        self.months.write().await.clear();
        self.years.write().await.clear();
    }
}

fn normalize(location: &str) -> String {
    location.trim().to_lowercase()
}
