//! Per-month temperature aggregation with bounded fan-out and memoization.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use ledgerlens_core::PeriodKey;
use ledgerlens_fetch::FetchError;
use tracing::{debug, info, instrument, warn};

use super::cache::PeriodCache;
use super::source::TemperatureSource;
use super::synthetic::synthetic_series;

/// Sub-fetches in flight at once for a full-year request.
pub const DEFAULT_CONCURRENCY: usize = 4;

// ============================================================================
// Period Aggregator
// ============================================================================

/// Builds 12-slot month maps from a [`TemperatureSource`].
///
/// Never fails: a month that errors or has no readings reads as `0.0`.
#[derive(Debug)]
pub struct PeriodAggregator<S> {
    source: S,
    cache: Arc<PeriodCache>,
    concurrency: usize,
    synthetic_fallback: bool,
}

impl<S: TemperatureSource> PeriodAggregator<S> {
    /// Creates an aggregator with its own empty cache.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: Arc::new(PeriodCache::new()),
            concurrency: DEFAULT_CONCURRENCY,
            synthetic_fallback: true,
        }
    }

    /// Shares an existing cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<PeriodCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Sets how many months are fetched at once (at least one).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enables or disables the synthetic series used when every month of a
    /// year failed.
    #[must_use]
    pub fn with_synthetic_fallback(mut self, enabled: bool) -> Self {
        self.synthetic_fallback = enabled;
        self
    }

    /// Returns the cache.
    pub fn cache(&self) -> &Arc<PeriodCache> {
        &self.cache
    }

    /// Returns the source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns all 12 months for `location` and `year`.
    ///
    /// With `month` set only that slot is fetched; the other eleven are zero.
    /// Without it the full year is fetched (or served from the year cache).
    /// An unconfigured source yields all zeros without any call.
    #[instrument(skip(self))]
    pub async fn aggregate(
        &self,
        location: &str,
        year: i32,
        month: Option<PeriodKey>,
    ) -> BTreeMap<PeriodKey, f64> {
        if !self.source.is_configured() {
            debug!("Temperature source not configured, returning zeros");
            return PeriodKey::zeroed();
        }

        match month {
            Some(period) => self.single_month(location, year, period).await,
            None => self.full_year(location, year).await,
        }
    }

    async fn single_month(
        &self,
        location: &str,
        year: i32,
        period: PeriodKey,
    ) -> BTreeMap<PeriodKey, f64> {
        let mut values = PeriodKey::zeroed();
        match self.month_value(location, year, period).await {
            Ok(value) => {
                values.insert(period, value.unwrap_or(0.0));
            }
            Err(e) => warn!(month = %period, error = %e, "Month fetch failed, using 0"),
        }
        values
    }

    async fn full_year(&self, location: &str, year: i32) -> BTreeMap<PeriodKey, f64> {
        if let Some(cached) = self.cache.year(location, year).await {
            debug!("Year cache hit");
            return cached;
        }

        let results: Vec<(PeriodKey, Result<Option<f64>, FetchError>)> =
            stream::iter(PeriodKey::ALL)
                .map(|period| async move {
                    (period, self.month_value(location, year, period).await)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut values = PeriodKey::zeroed();
        let mut failed = 0usize;
        for (period, result) in results {
            match result {
                Ok(value) => {
                    values.insert(period, value.unwrap_or(0.0));
                }
                Err(e) => {
                    failed += 1;
                    warn!(month = %period, error = %e, "Month fetch failed, using 0");
                }
            }
        }

        if failed == PeriodKey::ALL.len() && self.synthetic_fallback {
            info!("Temperature source unavailable, using synthetic series");
            return synthetic_series(location, year);
        }

        debug!(failed, "Year assembled");
        self.cache.put_year(location, year, values.clone()).await;
        values
    }

    /// One month through the month cache. Only successful answers are cached.
    async fn month_value(
        &self,
        location: &str,
        year: i32,
        period: PeriodKey,
    ) -> Result<Option<f64>, FetchError> {
        if let Some(cached) = self.cache.month(location, year, period).await {
            return Ok(cached);
        }

        let value = self.source.fetch_month(location, year, period).await?;
        self.cache.put_month(location, year, period, value).await;
        Ok(value)
    }
}
