//! Report fetch gated by the token lifecycle.
//!
//! [`ReportService`] is what callers use: it asks the
//! [`TokenLifecycleManager`] for a session, fetches the report through
//! [`QuickBooksClient`], and normalizes the result.

use std::collections::BTreeMap;

use ledgerlens_core::report::{self, ReportDocument, ReportMatrix};
use ledgerlens_core::{ColumnKey, PeriodKey};
use ledgerlens_fetch::{FetchError, TokenLifecycleManager};
use tracing::{debug, instrument};

use super::api::{QuickBooksClient, ReportRequest};

/// Credential context used when the caller does not name one.
pub const DEFAULT_CONTEXT: &str = "default";

/// Fetches and normalizes reports for one credential context.
#[derive(Debug, Clone)]
pub struct ReportService {
    manager: TokenLifecycleManager,
    client: QuickBooksClient,
    context: String,
}

impl ReportService {
    /// Creates a service on the default context.
    pub fn new(manager: TokenLifecycleManager, client: QuickBooksClient) -> Self {
        Self {
            manager,
            client,
            context: DEFAULT_CONTEXT.to_string(),
        }
    }

    /// Uses another credential context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Returns the token lifecycle manager.
    pub fn manager(&self) -> &TokenLifecycleManager {
        &self.manager
    }

    /// Returns the credential context.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Fetches the raw report, refreshing the token as needed.
    #[instrument(skip(self), fields(context = %self.context))]
    pub async fn fetch(&self, request: &ReportRequest) -> Result<ReportDocument, FetchError> {
        let client = &self.client;
        let document = self
            .manager
            .with_session(&self.context, |session| async move {
                client.fetch_report(&session, request).await
            })
            .await?;

        if let Some(header) = &document.header {
            debug!(
                report = header.report_name.as_deref().unwrap_or_default(),
                start = header.start_period.as_deref().unwrap_or_default(),
                end = header.end_period.as_deref().unwrap_or_default(),
                currency = header.currency.as_deref().unwrap_or_default(),
                summarized_by = header.summarize_columns_by.as_deref().unwrap_or_default(),
                rows = document.rows().len(),
                "Report received"
            );
        }
        Ok(document)
    }

    /// Fetches and buckets a date-keyed report by month.
    pub async fn flat(
        &self,
        request: &ReportRequest,
    ) -> Result<BTreeMap<PeriodKey, f64>, FetchError> {
        let document = self.fetch(request).await?;
        Ok(report::aggregate(&document))
    }

    /// Fetches a report and keeps its row hierarchy.
    pub async fn matrix(&self, request: &ReportRequest) -> Result<ReportMatrix, FetchError> {
        let document = self.fetch(request).await?;
        Ok(report::project(&document))
    }

    /// Fetches a column-by-period report and returns one value per column.
    pub async fn column_series(
        &self,
        request: &ReportRequest,
    ) -> Result<Vec<(ColumnKey, f64)>, FetchError> {
        let document = self.fetch(request).await?;
        Ok(period_series(&document))
    }
}

/// One value per period column: the report's own net income line when it
/// has one, otherwise the sum of its data rows.
pub fn period_series(document: &ReportDocument) -> Vec<(ColumnKey, f64)> {
    if let Some(net) = report::net_income(document) {
        debug!(columns = net.len(), "Using net income line");
        net
    } else {
        report::column_totals(document)
    }
}
