//! Monthly temperature series.
//!
//! ## Pieces
//!
//! - [`TemperatureSource`] - One month's mean temperature
//! - [`WeatherApiClient`] - WeatherAPI.com history source (10s timeout,
//!   3 attempts with jittered backoff)
//! - [`PeriodCache`] - Month and year memo tiers
//! - [`PeriodAggregator`] - 12-slot maps with bounded fan-out
//! - [`synthetic_series`] - Deterministic stand-in when the source is down
//!
//! ## Usage
//!
//! ```ignore
//! use ledgerlens_providers::weather::{PeriodAggregator, WeatherApiClient};
//!
//! let aggregator = PeriodAggregator::new(WeatherApiClient::new(api_key)?);
//! let temps = aggregator.aggregate("78701", 2024, None).await;
//! ```

// Modules
mod aggregator;
mod api;
mod cache;
mod source;
mod synthetic;

// Re-exports
pub use aggregator::{PeriodAggregator, DEFAULT_CONCURRENCY};
pub use api::{
    HistoryResponse, WeatherApiClient, API_BASE_URL, HISTORY_ENDPOINT, WEATHER_MAX_ATTEMPTS,
    WEATHER_TIMEOUT_SECS,
};
pub use cache::PeriodCache;
pub use source::TemperatureSource;
pub use synthetic::{synthetic_series, SYNTHETIC_MAX_F, SYNTHETIC_MIN_F};
