// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LedgerLens` Providers
//!
//! Upstream integrations for the `LedgerLens` workspace.
//!
//! | Upstream | Module | Auth | Retry |
//! |----------|--------|------|-------|
//! | QuickBooks Online reports | [`quickbooks`] | OAuth 2.0 bearer, refresh once on 401 | none |
//! | WeatherAPI.com history | [`weather`] | API key | 3 attempts, jittered backoff |
//!
//! [`chart`] joins the two month series.
//!
//! ## Usage
//!
//! ```ignore
//! use ledgerlens_providers::chart::join_series;
//! use ledgerlens_providers::quickbooks::{period_series, ReportRequest, ReportType};
//!
//! let document = service.fetch(&ReportRequest::trailing_year(ReportType::ProfitAndLoss, today)).await?;
//! let temps = aggregator.aggregate("78701", 2024, None).await;
//! let chart = join_series(&period_series(&document), &temps);
//! ```

pub mod chart;
pub mod quickbooks;
pub mod weather;

// Re-export key types
pub use chart::{join_series, ChartPoint};
pub use quickbooks::{
    IntuitTokenClient, OAuthConfig, QuickBooksClient, QuickBooksEnvironment, ReportRequest,
    ReportService, ReportType,
};
pub use weather::{PeriodAggregator, PeriodCache, TemperatureSource, WeatherApiClient};
