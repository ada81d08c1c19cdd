//! User settings with persistence and environment overrides.
//!
//! Precedence, lowest first: built-in defaults, `settings.json`, the process
//! environment (a `.env` file in the working directory is read into it).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

// ============================================================================
// Environment Variables
// ============================================================================

/// QuickBooks environment (`sandbox` or `production`).
pub const ENV_QB_ENV: &str = "QB_ENV";
/// OAuth client id.
pub const ENV_QB_CLIENT_ID: &str = "QB_CLIENT_ID";
/// OAuth client secret.
pub const ENV_QB_CLIENT_SECRET: &str = "QB_CLIENT_SECRET";
/// OAuth redirect URI.
pub const ENV_QB_REDIRECT_URI: &str = "QB_REDIRECT_URI";
/// Accounting API minor version.
pub const ENV_QB_MINOR_VERSION: &str = "QB_MINOR_VERSION";
/// OAuth scope.
pub const ENV_QB_SCOPE: &str = "QB_SCOPE";
/// WeatherAPI.com key.
pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";

// ============================================================================
// Settings Model
// ============================================================================

/// Application settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// QuickBooks environment name, `sandbox` or `production`.
    pub environment: String,
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
    /// OAuth redirect URI registered with the app.
    pub redirect_uri: Option<String>,
    /// OAuth scope override.
    pub scope: Option<String>,
    /// Accounting API minor version override.
    pub minor_version: Option<String>,
    /// Credential context used when none is given.
    pub context: String,
    /// Where credentials are kept.
    pub credential_backend: CredentialBackend,

    /// WeatherAPI.com key; without one temperatures read as zero.
    pub weather_api_key: Option<String>,
    /// Location used when a command does not name one.
    pub default_location: Option<String>,
    /// Months fetched at once for a full-year temperature request.
    pub weather_concurrency: usize,
    /// Use the synthetic series when the weather source is unreachable.
    pub synthetic_fallback: bool,

    /// Default log level for the CLI.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            scope: None,
            minor_version: None,
            context: "default".to_string(),
            credential_backend: CredentialBackend::default(),
            weather_api_key: None,
            default_location: None,
            weather_concurrency: 4,
            synthetic_fallback: true,
            log_level: LogLevel::default(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("environment", &self.environment)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("minor_version", &self.minor_version)
            .field("context", &self.context)
            .field("credential_backend", &self.credential_backend)
            .field("weather_api_key", &self.weather_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_location", &self.default_location)
            .field("weather_concurrency", &self.weather_concurrency)
            .field("synthetic_fallback", &self.synthetic_fallback)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Settings {
    /// Applies overrides from `lookup`. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(env) = get(ENV_QB_ENV) {
            self.environment = env;
        }
        let overrides = [
            (ENV_QB_CLIENT_ID, &mut self.client_id),
            (ENV_QB_CLIENT_SECRET, &mut self.client_secret),
            (ENV_QB_REDIRECT_URI, &mut self.redirect_uri),
            (ENV_QB_MINOR_VERSION, &mut self.minor_version),
            (ENV_QB_SCOPE, &mut self.scope),
            (ENV_WEATHER_API_KEY, &mut self.weather_api_key),
        ];
        for (name, slot) in overrides {
            if let Some(value) = get(name) {
                debug!(var = name, "Settings override from environment");
                *slot = Some(value);
            }
        }
    }

    /// Applies overrides from the process environment, after reading `.env`
    /// if present.
    pub fn apply_process_env(&mut self) {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        self.apply_env(|name| std::env::var(name).ok());
    }

    /// Returns true when the OAuth client settings are all present.
    pub fn has_oauth_client(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.redirect_uri.is_some()
    }
}

/// Credential storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    /// JSON file next to the settings.
    #[default]
    File,
    /// OS keychain.
    Keychain,
    /// Process memory only; nothing survives the run.
    Memory,
}

impl std::fmt::Display for CredentialBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialBackend::File => write!(f, "file"),
            CredentialBackend::Keychain => write!(f, "keychain"),
            CredentialBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for CredentialBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(CredentialBackend::File),
            "keychain" | "keyring" => Ok(CredentialBackend::Keychain),
            "memory" => Ok(CredentialBackend::Memory),
            other => Err(StoreError::Parse(format!("unknown credential backend: {other}"))),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings loaded from (and saved back to) one file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding defaults, backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if an existing settings file cannot be parsed.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. A missing file yields defaults; a file
    /// that exists but does not parse is an error.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = match load_json::<Settings>(&path).await {
            Ok(settings) => {
                info!(path = %path.display(), "Loaded settings");
                settings
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Settings file not found, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load settings");
                return Err(StoreError::Config(format!(
                    "{} is not valid settings JSON: {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Gets a copy of the current settings with environment overrides
    /// applied. The stored settings are left untouched.
    pub async fn effective(&self) -> Settings {
        let mut settings = self.get().await;
        settings.apply_process_env();
        settings
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.environment, "sandbox");
        assert_eq!(settings.context, "default");
        assert_eq!(settings.credential_backend, CredentialBackend::File);
        assert_eq!(settings.weather_concurrency, 4);
        assert!(settings.synthetic_fallback);
        assert!(!settings.has_oauth_client());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings {
            client_id: Some("from-file".into()),
            ..Settings::default()
        };
        settings.apply_env(lookup(&[
            ("QB_ENV", "production"),
            ("QB_CLIENT_ID", "cid"),
            ("QB_CLIENT_SECRET", "secret"),
            ("QB_REDIRECT_URI", "http://localhost:8080/callback"),
            ("QB_MINOR_VERSION", "70"),
            ("WEATHER_API_KEY", "wk"),
        ]));

        assert_eq!(settings.environment, "production");
        assert_eq!(settings.client_id.as_deref(), Some("cid"));
        assert_eq!(settings.minor_version.as_deref(), Some("70"));
        assert_eq!(settings.weather_api_key.as_deref(), Some("wk"));
        assert_eq!(settings.scope, None);
        assert!(settings.has_oauth_client());
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut settings = Settings {
            weather_api_key: Some("kept".into()),
            ..Settings::default()
        };
        settings.apply_env(lookup(&[("WEATHER_API_KEY", "  "), ("QB_ENV", "")]));

        assert_eq!(settings.weather_api_key.as_deref(), Some("kept"));
        assert_eq!(settings.environment, "sandbox");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"environment": "production", "credential_backend": "keychain"}"#)
                .unwrap();
        assert_eq!(settings.environment, "production");
        assert_eq!(settings.credential_backend, CredentialBackend::Keychain);
        assert_eq!(settings.context, "default");
        assert!(settings.synthetic_fallback);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = Settings {
            client_secret: Some("hunter2".into()),
            weather_api_key: Some("wk-secret".into()),
            ..Settings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("wk-secret"));
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("File".parse::<CredentialBackend>().unwrap(), CredentialBackend::File);
        assert_eq!("keyring".parse::<CredentialBackend>().unwrap(), CredentialBackend::Keychain);
        assert!("vault".parse::<CredentialBackend>().is_err());
    }
}
