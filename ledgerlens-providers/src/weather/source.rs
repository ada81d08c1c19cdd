//! The per-month temperature source seam.

use std::future::Future;

use ledgerlens_core::PeriodKey;
use ledgerlens_fetch::FetchError;

/// Something that can report the average temperature of one month.
///
/// Implementors of this trait are responsible for:
/// - Talking to the upstream (with their own timeout and retry policy)
/// - Reducing per-day readings to one monthly mean
///
/// The aggregator never calls an unconfigured source.
pub trait TemperatureSource: Send + Sync {
    /// Returns true if the source has what it needs (e.g. an API key).
    fn is_configured(&self) -> bool {
        true
    }

    /// Fetches the mean temperature for `month` of `year` at `location`.
    ///
    /// # Returns
    /// * `Ok(Some(mean))` - Readings found
    /// * `Ok(None)` - Upstream answered but had no readings (or the month
    ///   has not started yet)
    /// * `Err(e)` - Upstream failure after retries
    fn fetch_month(
        &self,
        location: &str,
        year: i32,
        month: PeriodKey,
    ) -> impl Future<Output = Result<Option<f64>, FetchError>> + Send;
}
