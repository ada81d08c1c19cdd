//! Wiring from settings to clients.

use std::sync::Arc;

use anyhow::{Context, Result};
use ledgerlens_fetch::{CredentialStore, FetchError, TokenLifecycleManager};
use ledgerlens_providers::quickbooks::DEFAULT_SCOPE;
use ledgerlens_providers::{
    IntuitTokenClient, OAuthConfig, PeriodAggregator, QuickBooksClient, QuickBooksEnvironment,
    ReportService, WeatherApiClient,
};
use ledgerlens_store::{Settings, SettingsStore, default_credentials_path, open_credential_store};
use tracing::debug;

/// Effective settings plus the store they came from.
pub struct App {
    /// Settings with environment overrides applied.
    pub settings: Settings,
    /// The settings file.
    pub store: SettingsStore,
    /// Credential context for this run.
    pub context: String,
}

impl App {
    /// Loads settings and applies environment overrides.
    pub async fn load(context: Option<&str>) -> Result<Self> {
        let store = SettingsStore::load_default().await?;
        let settings = store.effective().await;
        let context = context
            .map(str::to_string)
            .unwrap_or_else(|| settings.context.clone());
        debug!(context = %context, backend = %settings.credential_backend, "Settings loaded");

        Ok(Self {
            settings,
            store,
            context,
        })
    }

    /// Parses the configured QuickBooks environment.
    pub fn environment(&self) -> Result<QuickBooksEnvironment> {
        self.settings
            .environment
            .parse()
            .map_err(|e| FetchError::Config(format!("{e}")).into())
    }

    /// Builds the OAuth client config.
    pub fn oauth_config(&self) -> Result<OAuthConfig> {
        let s = &self.settings;
        let missing = |name: &str| FetchError::Config(format!("{name} is not set"));

        let client_id = s.client_id.clone().ok_or_else(|| missing("QB_CLIENT_ID"))?;
        let client_secret = s
            .client_secret
            .clone()
            .ok_or_else(|| missing("QB_CLIENT_SECRET"))?;
        let redirect_uri = s
            .redirect_uri
            .clone()
            .ok_or_else(|| missing("QB_REDIRECT_URI"))?;

        Ok(OAuthConfig::new(client_id, client_secret, redirect_uri)
            .with_scope(s.scope.as_deref().unwrap_or(DEFAULT_SCOPE)))
    }

    /// Opens the configured credential store.
    pub fn credential_store(&self) -> Arc<dyn CredentialStore> {
        open_credential_store(self.settings.credential_backend, default_credentials_path())
    }

    /// Builds the token client.
    pub fn token_client(&self) -> Result<IntuitTokenClient> {
        Ok(IntuitTokenClient::new(self.oauth_config()?)?)
    }

    /// Builds the token lifecycle manager.
    pub fn token_manager(&self) -> Result<TokenLifecycleManager> {
        Ok(TokenLifecycleManager::new(
            self.credential_store(),
            Arc::new(self.token_client()?),
        ))
    }

    /// Builds the report service for this run's context.
    pub fn report_service(&self) -> Result<ReportService> {
        let mut client = QuickBooksClient::new(self.environment()?)?;
        if let Some(minor) = &self.settings.minor_version {
            client = client.with_minor_version(minor.clone());
        }
        Ok(ReportService::new(self.token_manager()?, client).with_context(self.context.clone()))
    }

    /// Builds the temperature aggregator.
    pub fn aggregator(&self) -> Result<PeriodAggregator<WeatherApiClient>> {
        let source = WeatherApiClient::new(self.settings.weather_api_key.clone())?;
        Ok(PeriodAggregator::new(source)
            .with_concurrency(self.settings.weather_concurrency)
            .with_synthetic_fallback(self.settings.synthetic_fallback))
    }

    /// Resolves the location from the argument or the configured default.
    pub fn location(&self, arg: Option<&str>) -> Result<String> {
        arg.map(str::to_string)
            .or_else(|| self.settings.default_location.clone())
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| FetchError::Config("no location given and none configured".into()))
            .context("pass --location or set default_location")
    }
}
