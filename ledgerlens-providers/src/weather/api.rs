//! WeatherAPI.com history client.
//!
//! # API Endpoint
//!
//! ```text
//! GET https://api.weatherapi.com/v1/history.json?key=<key>&q=<location>&dt=2024-03-01&end_dt=2024-03-31
//! ```
//!
//! # Response Format
//!
//! ```json
//! {
//!   "location": {"name": "Austin"},
//!   "forecast": {"forecastday": [{"date": "2024-03-01", "day": {"avgtemp_f": 61.2}}]}
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{Months, NaiveDate};
use ledgerlens_core::report::round_cents;
use ledgerlens_core::{Clock, PeriodKey, SystemClock};
use ledgerlens_fetch::{FetchError, HttpClient, RetryStrategy};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::source::TemperatureSource;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for WeatherAPI.com.
pub const API_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// History endpoint.
pub const HISTORY_ENDPOINT: &str = "/history.json";

/// Weather requests time out after this many seconds.
pub const WEATHER_TIMEOUT_SECS: u64 = 10;

/// Attempts per history request, first one included.
pub const WEATHER_MAX_ATTEMPTS: u32 = 3;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from the history endpoint. Everything is optional; a response
/// without readings just means "no data".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    /// Forecast block.
    #[serde(default)]
    pub forecast: Option<Forecast>,
}

/// Per-day list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Forecast {
    /// One entry per day in the window.
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

/// One day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastDay {
    /// Date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<String>,
    /// Daily aggregates.
    #[serde(default)]
    pub day: Option<DayStats>,
}

/// Daily aggregates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayStats {
    /// Average temperature in Fahrenheit.
    #[serde(default)]
    pub avgtemp_f: Option<f64>,
}

impl HistoryResponse {
    /// Mean of the daily averages, or `None` without readings.
    pub fn mean_avgtemp_f(&self) -> Option<f64> {
        let readings: Vec<f64> = self
            .forecast
            .iter()
            .flat_map(|f| &f.forecastday)
            .filter_map(|d| d.day.as_ref()?.avgtemp_f)
            .filter(|t| t.is_finite())
            .collect();

        if readings.is_empty() {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = readings.iter().sum::<f64>() / readings.len() as f64;
        Some(round_cents(mean))
    }
}

// ============================================================================
// API Client
// ============================================================================

/// WeatherAPI.com client; one history request per month.
#[derive(Clone)]
pub struct WeatherApiClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for WeatherApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiClient")
            .field("base_url", &self.base_url)
            .field("configured", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl WeatherApiClient {
    /// Creates a client. A missing or blank key leaves it unconfigured.
    pub fn new(api_key: Option<String>) -> Result<Self, FetchError> {
        let retry = RetryStrategy::new(WEATHER_MAX_ATTEMPTS)
            .with_base_delay(Duration::from_millis(500));
        Ok(Self {
            http: HttpClient::with_timeout(Duration::from_secs(WEATHER_TIMEOUT_SECS))?
                .with_retry_strategy(retry),
            base_url: API_BASE_URL.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            clock: Arc::new(SystemClock),
        })
    }

    /// Points the client at another base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the retry strategy.
    #[must_use]
    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.http = self.http.with_retry_strategy(strategy);
        self
    }

    /// Replaces the clock used to decide which months have started.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fetches one month of history.
    #[instrument(skip(self))]
    async fn fetch_history(
        &self,
        location: &str,
        year: i32,
        month: PeriodKey,
    ) -> Result<Option<f64>, FetchError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(FetchError::Config("weather API key is not set".into()));
        };

        let today = self.clock.now().date_naive();
        let Some((start, end)) = month_window(year, month, today) else {
            debug!("Month has not started, no history yet");
            return Ok(None);
        };

        let url = format!("{}{}", self.base_url, HISTORY_ENDPOINT);
        let query = [
            ("key", key.to_string()),
            ("q", location.to_string()),
            ("dt", start.format("%Y-%m-%d").to_string()),
            ("end_dt", end.format("%Y-%m-%d").to_string()),
        ];

        let response: HistoryResponse = self.http.get_json_with_retry(&url, &query).await?;
        let mean = response.mean_avgtemp_f();
        debug!(mean = ?mean, "History received");
        Ok(mean)
    }
}

impl TemperatureSource for WeatherApiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn fetch_month(
        &self,
        location: &str,
        year: i32,
        month: PeriodKey,
    ) -> impl std::future::Future<Output = Result<Option<f64>, FetchError>> + Send {
        self.fetch_history(location, year, month)
    }
}

/// First and last day to ask for: the whole month, cut at `today`.
/// `None` if the month starts after `today` or the year is out of range.
fn month_window(year: i32, month: PeriodKey, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month.month(), 1)?;
    if start > today {
        return None;
    }
    let last = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((start, last.min(today)))
}
