//! HTTP client with per-client timeout, status mapping, and optional retry.

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::FetchError;
use crate::retry::RetryStrategy;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest error body kept in [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// User agent string for `LedgerLens`.
const USER_AGENT: &str = concat!("ledgerlens/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client used by every upstream integration.
///
/// Single-shot methods never retry; [`HttpClient::get_json_with_retry`] runs
/// the configured [`RetryStrategy`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    timeout: Duration,
    retry_strategy: RetryStrategy,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            timeout,
            retry_strategy: RetryStrategy::no_retry(),
        })
    }

    /// Sets the retry strategy for [`HttpClient::get_json_with_retry`].
    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Returns the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs a GET with a bearer token and decodes the JSON body.
    ///
    /// A 401 becomes [`FetchError::Unauthorized`] so the caller can refresh.
    #[instrument(skip(self, query, token), fields(url = %url))]
    pub async fn get_json_with_bearer<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<T, FetchError> {
        let request = self
            .inner
            .get(url)
            .query(query)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json");
        self.send_json(request).await
    }

    /// Performs a POST of a URL-encoded form with HTTP basic auth.
    #[instrument(skip(self, form, username, password), fields(url = %url))]
    pub async fn post_form_basic<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
        username: &str,
        password: &str,
    ) -> Result<T, FetchError> {
        let request = self
            .inner
            .post(url)
            .basic_auth(username, Some(password))
            .header(header::ACCEPT, "application/json")
            .form(form);
        self.send_json(request).await
    }

    /// Performs a plain GET and decodes the JSON body. Single attempt.
    #[instrument(skip(self, query), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let request = self
            .inner
            .get(url)
            .query(query)
            .header(header::ACCEPT, "application/json");
        self.send_json(request).await
    }

    /// Performs a plain GET under the retry strategy.
    ///
    /// Connection errors, timeouts, 429 and 5xx are retried; anything else
    /// fails on the spot.
    pub async fn get_json_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        self.retry_strategy
            .run(move |attempt| {
                debug!(url = %url, attempt, "GET with retry");
                self.get_json(url, query)
            })
            .await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, FetchError> {
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let response = check_status(response).await?;
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn map_send_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::Http(error)
        }
    }
}

/// Maps a non-success response to the matching [`FetchError`].
async fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    debug!(status = %status, "Response received");

    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(FetchError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            Err(FetchError::RateLimited { retry_after })
        }
        _ => {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            Err(FetchError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
