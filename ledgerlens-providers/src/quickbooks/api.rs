//! QuickBooks Online reports API client.
//!
//! # API Endpoint
//!
//! ```text
//! GET https://quickbooks.api.intuit.com/v3/company/<realm>/reports/<ReportType>
//!     ?start_date=2024-01-01&end_date=2024-12-31&summarize_column_by=Month&minorversion=75
//! Authorization: Bearer <access_token>
//! Accept: application/json
//! ```
//!
//! # Response Format
//!
//! ```json
//! {
//!   "Header": {"ReportName": "ProfitAndLoss", "StartPeriod": "2024-01-01"},
//!   "Columns": {"Column": [{"ColTitle": "", "ColType": "Account"}, {"ColTitle": "Jan 2024", "ColType": "Money"}]},
//!   "Rows": {"Row": [{"Header": {...}, "Rows": {"Row": [...]}, "Summary": {...}}]}
//! }
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use ledgerlens_core::CoreError;
use ledgerlens_core::report::ReportDocument;
use ledgerlens_fetch::{FetchError, HttpClient, Session};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

// ============================================================================
// Constants
// ============================================================================

/// Sandbox company API base.
pub const SANDBOX_API_BASE: &str = "https://sandbox-quickbooks.api.intuit.com/v3/company";

/// Production company API base.
pub const PRODUCTION_API_BASE: &str = "https://quickbooks.api.intuit.com/v3/company";

/// API minor version sent with every request unless configured otherwise.
pub const DEFAULT_MINOR_VERSION: &str = "75";

/// Report requests time out after this many seconds.
pub const REPORT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Environment
// ============================================================================

/// Which Intuit environment the app talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickBooksEnvironment {
    /// Sandbox companies.
    #[default]
    Sandbox,
    /// Live companies.
    Production,
}

impl QuickBooksEnvironment {
    /// Returns the company API base URL.
    pub fn api_base(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_API_BASE,
            Self::Production => PRODUCTION_API_BASE,
        }
    }
}

impl FromStr for QuickBooksEnvironment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" | "development" | "dev" => Ok(Self::Sandbox),
            "production" | "prod" | "live" => Ok(Self::Production),
            other => Err(CoreError::InvalidConfig(format!(
                "unknown QuickBooks environment '{other}'"
            ))),
        }
    }
}

impl fmt::Display for QuickBooksEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        })
    }
}

// ============================================================================
// Report Request
// ============================================================================

/// Report endpoints this client knows how to ask for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReportType {
    /// Profit and Loss, summarized by month.
    #[default]
    ProfitAndLoss,
    /// Balance Sheet, summarized by month.
    BalanceSheet,
    /// Statement of Cash Flows, summarized by month.
    CashFlow,
    /// Transaction List; one row per transaction.
    TransactionList,
}

impl ReportType {
    /// Endpoint name as it appears in the URL path.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProfitAndLoss => "ProfitAndLoss",
            Self::BalanceSheet => "BalanceSheet",
            Self::CashFlow => "CashFlow",
            Self::TransactionList => "TransactionList",
        }
    }

    /// Parameters sent unless the request overrides them.
    pub fn default_params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::ProfitAndLoss | Self::BalanceSheet | Self::CashFlow => {
                &[("summarize_column_by", "Month")]
            }
            Self::TransactionList => &[],
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "profitandloss" | "pnl" | "pl" => Ok(Self::ProfitAndLoss),
            "balancesheet" | "bs" => Ok(Self::BalanceSheet),
            "cashflow" => Ok(Self::CashFlow),
            "transactionlist" | "transactions" => Ok(Self::TransactionList),
            _ => Err(CoreError::InvalidConfig(format!("unknown report type '{s}'"))),
        }
    }
}

/// One report fetch: which report, which window, which extra parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Report endpoint.
    pub report_type: ReportType,
    /// First day of the window.
    pub start_date: NaiveDate,
    /// Last day of the window.
    pub end_date: NaiveDate,
    /// Extra query parameters; these win over the report's defaults.
    pub params: Vec<(String, String)>,
}

impl ReportRequest {
    /// Creates a request for an explicit window.
    pub fn new(report_type: ReportType, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            report_type,
            start_date,
            end_date,
            params: Vec::new(),
        }
    }

    /// Creates a request for the 365 days ending on `today`.
    pub fn trailing_year(report_type: ReportType, today: NaiveDate) -> Self {
        let start = today.checked_sub_days(Days::new(365)).unwrap_or(today);
        Self::new(report_type, start, today)
    }

    /// Adds or replaces a query parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.params.retain(|(n, _)| *n != name);
        self.params.push((name, value.into()));
        self
    }

    /// Builds the full query, minor version included.
    pub fn query(&self, minor_version: &str) -> Vec<(&str, String)> {
        let mut query = vec![
            ("start_date", self.start_date.format("%Y-%m-%d").to_string()),
            ("end_date", self.end_date.format("%Y-%m-%d").to_string()),
        ];

        for &(name, value) in self.report_type.default_params() {
            if !self.params.iter().any(|(n, _)| n == name) {
                query.push((name, value.to_string()));
            }
        }
        for (name, value) in &self.params {
            query.push((name.as_str(), value.clone()));
        }

        query.push(("minorversion", minor_version.to_string()));
        query
    }
}

// ============================================================================
// API Client
// ============================================================================

/// QuickBooks Online reports client. One attempt per call; token handling
/// lives in [`ledgerlens_fetch::TokenLifecycleManager`].
#[derive(Debug, Clone)]
pub struct QuickBooksClient {
    http: HttpClient,
    base_url: String,
    minor_version: String,
}

impl QuickBooksClient {
    /// Creates a client for `environment`.
    pub fn new(environment: QuickBooksEnvironment) -> Result<Self, FetchError> {
        Self::with_base_url(environment.api_base())
    }

    /// Creates a client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpClient::with_timeout(Duration::from_secs(REPORT_TIMEOUT_SECS))?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            minor_version: DEFAULT_MINOR_VERSION.to_string(),
        })
    }

    /// Sets the API minor version.
    #[must_use]
    pub fn with_minor_version(mut self, minor_version: impl Into<String>) -> Self {
        self.minor_version = minor_version.into();
        self
    }

    /// Returns the URL of a report endpoint for `realm_id`.
    pub fn report_url(&self, realm_id: &str, report_type: ReportType) -> String {
        format!("{}/{}/reports/{}", self.base_url, realm_id, report_type.as_str())
    }

    /// Fetches one report.
    ///
    /// A 401 surfaces as [`FetchError::Unauthorized`]; run this inside
    /// [`ledgerlens_fetch::TokenLifecycleManager::with_session`] to get the
    /// single refresh-and-retry.
    #[instrument(skip(self, session), fields(report = %request.report_type))]
    pub async fn fetch_report(
        &self,
        session: &Session,
        request: &ReportRequest,
    ) -> Result<ReportDocument, FetchError> {
        let url = self.report_url(&session.realm_id, request.report_type);
        debug!(
            url = %url,
            start = %request.start_date,
            end = %request.end_date,
            "Fetching report"
        );

        let query = request.query(&self.minor_version);
        let document: ReportDocument = self
            .http
            .get_json_with_bearer(&url, &query, &session.access_token)
            .await?;

        debug!(
            columns = document.columns().len(),
            rows = document.rows().len(),
            "Report received"
        );
        Ok(document)
    }
}
