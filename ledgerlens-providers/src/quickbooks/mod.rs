//! QuickBooks Online integration.
//!
//! ## Pieces
//!
//! - [`QuickBooksClient`] - `GET <base>/<realm>/reports/<ReportType>`, one attempt
//! - [`IntuitTokenClient`] - Token endpoint: refresh and code exchange
//! - [`OAuthConfig`] - App registration and consent URL
//! - [`ReportService`] - Report fetch wrapped in the token lifecycle
//!
//! ## Environments
//!
//! | Environment | Company API base |
//! |-------------|------------------|
//! | Sandbox | `https://sandbox-quickbooks.api.intuit.com/v3/company` |
//! | Production | `https://quickbooks.api.intuit.com/v3/company` |
//!
//! ## Usage
//!
//! ```ignore
//! use ledgerlens_providers::quickbooks::{ReportRequest, ReportService, ReportType};
//!
//! let request = ReportRequest::trailing_year(ReportType::ProfitAndLoss, today);
//! let matrix = service.matrix(&request).await?;
//! ```

// Modules
mod api;
mod oauth;
mod service;

// Re-exports
pub use api::{
    QuickBooksClient, QuickBooksEnvironment, ReportRequest, ReportType, DEFAULT_MINOR_VERSION,
    PRODUCTION_API_BASE, REPORT_TIMEOUT_SECS, SANDBOX_API_BASE,
};
pub use oauth::{
    IntuitTokenClient, OAuthConfig, AUTHORIZE_URL, DEFAULT_SCOPE, TOKEN_TIMEOUT_SECS, TOKEN_URL,
};
pub use service::{period_series, ReportService, DEFAULT_CONTEXT};
