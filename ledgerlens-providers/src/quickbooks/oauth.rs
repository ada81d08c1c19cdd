//! Intuit OAuth 2.0 token endpoint and consent URL.
//!
//! ## Flow
//!
//! 1. **Consent**: send the user to [`OAuthConfig::authorization_url`]
//! 2. **Callback**: Intuit redirects back with `code` and `realmId`
//! 3. **Exchange**: [`IntuitTokenClient::exchange_code`] trades the code for
//!    a token bundle, which the caller stores with
//!    [`ledgerlens_fetch::TokenLifecycleManager::store_bundle`]
//! 4. **Refresh**: [`IntuitTokenClient`] implements
//!    [`ledgerlens_fetch::TokenRefresher`]
//!
//! Intuit rotates refresh tokens; the one in each response replaces the
//! stored one.

use std::time::Duration;

use async_trait::async_trait;
use ledgerlens_core::TokenBundle;
use ledgerlens_fetch::{FetchError, HttpClient, TokenRefresher};
use tracing::{debug, instrument, warn};
use url::Url;

// ============================================================================
// Constants
// ============================================================================

/// Intuit's OAuth token endpoint.
pub const TOKEN_URL: &str = "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer";

/// Intuit's consent page.
pub const AUTHORIZE_URL: &str = "https://appcenter.intuit.com/connect/oauth2";

/// Scope needed for the accounting reports API.
pub const DEFAULT_SCOPE: &str = "com.intuit.quickbooks.accounting";

/// Token endpoint requests time out after this many seconds.
pub const TOKEN_TIMEOUT_SECS: u64 = 20;

// ============================================================================
// Config
// ============================================================================

/// App registration details for the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    /// App client id.
    pub client_id: String,
    /// App client secret.
    pub client_secret: String,
    /// Redirect URI registered with the app.
    pub redirect_uri: String,
    /// Space-separated scopes.
    pub scope: String,
    /// Token endpoint.
    pub token_url: String,
    /// Consent page.
    pub authorize_url: String,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl OAuthConfig {
    /// Creates a config against Intuit's production OAuth endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
            token_url: TOKEN_URL.to_string(),
            authorize_url: AUTHORIZE_URL.to_string(),
        }
    }

    /// Overrides the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Overrides the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Checks that client id and secret are set.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] naming the first missing field.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.client_id.trim().is_empty() {
            return Err(FetchError::Config("QuickBooks client id is not set".into()));
        }
        if self.client_secret.trim().is_empty() {
            return Err(FetchError::Config("QuickBooks client secret is not set".into()));
        }
        Ok(())
    }

    /// Builds the consent page URL the user opens to authorize the app.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] if the client id, redirect URI or
    /// consent URL is unusable.
    pub fn authorization_url(&self, state: &str) -> Result<String, FetchError> {
        if self.client_id.trim().is_empty() {
            return Err(FetchError::Config("QuickBooks client id is not set".into()));
        }
        if self.redirect_uri.trim().is_empty() {
            return Err(FetchError::Config("QuickBooks redirect URI is not set".into()));
        }

        let url = Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("scope", self.scope.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| FetchError::Config(format!("invalid authorize URL: {e}")))?;

        Ok(url.into())
    }
}

// ============================================================================
// Token Client
// ============================================================================

/// Client for the Intuit token endpoint.
#[derive(Debug, Clone)]
pub struct IntuitTokenClient {
    http: HttpClient,
    config: OAuthConfig,
}

impl IntuitTokenClient {
    /// Creates a token client.
    pub fn new(config: OAuthConfig) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpClient::with_timeout(Duration::from_secs(TOKEN_TIMEOUT_SECS))?,
            config,
        })
    }

    /// Returns the config.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Trades a one-time authorization code for the first token bundle.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenBundle, FetchError> {
        self.config.validate()?;
        debug!("Exchanging authorization code");

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        self.post(&form).await.map_err(|e| {
            warn!(error = %e, "Authorization code exchange failed");
            FetchError::NotAuthenticated(format!("authorization code exchange failed: {e}"))
        })
    }

    async fn post(&self, form: &[(&str, &str)]) -> Result<TokenBundle, FetchError> {
        self.http
            .post_form_basic(
                &self.config.token_url,
                form,
                &self.config.client_id,
                &self.config.client_secret,
            )
            .await
    }
}

#[async_trait]
impl TokenRefresher for IntuitTokenClient {
    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, FetchError> {
        self.config.validate()?;
        debug!("Refreshing access token");

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        self.post(&form).await.map_err(|e| {
            warn!(error = %e, "Token refresh rejected");
            FetchError::RefreshFailed(e.to_string())
        })
    }
}
