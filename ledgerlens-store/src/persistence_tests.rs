//! Persistence round-trip and edge case tests.
//!
//! Covers JSON file I/O, settings files, and the settings store.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::persistence::{load_json, load_json_or_default, save_json};
use crate::settings::{CredentialBackend, LogLevel, Settings, SettingsStore};

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    save_json(&nested_path, &serde_json::json!({"key": "value"}))
        .await
        .unwrap();
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");

    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.unwrap_err().is_not_found());

    let fallback: Settings = load_json_or_default(&file_path).await;
    assert_eq!(fallback, Settings::default());
}

#[tokio::test]
async fn test_atomic_write_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("atomic.json");

    save_json(&file_path, &Settings::default()).await.unwrap();

    assert!(!file_path.with_extension("json.tmp").exists());
    assert!(file_path.exists());
}

// ============================================================================
// Settings Files
// ============================================================================

#[tokio::test]
async fn test_settings_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");

    let settings = Settings {
        environment: "production".into(),
        client_id: Some("cid".into()),
        client_secret: Some("secret".into()),
        redirect_uri: Some("http://localhost:8080/callback".into()),
        scope: Some("com.intuit.quickbooks.accounting openid".into()),
        minor_version: Some("70".into()),
        context: "acme".into(),
        credential_backend: CredentialBackend::Keychain,
        weather_api_key: Some("wk".into()),
        default_location: Some("Zürich".into()),
        weather_concurrency: 2,
        synthetic_fallback: false,
        log_level: LogLevel::Debug,
    };

    save_json(&file_path, &settings).await.unwrap();
    let loaded: Settings = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_load_minimal_json_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("minimal.json");
    tokio::fs::write(&file_path, "{}").await.unwrap();

    let loaded: Settings = load_json(&file_path).await.unwrap();
    assert_eq!(loaded, Settings::default());
}

#[tokio::test]
async fn test_load_json_with_unknown_fields() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("extra_fields.json");

    let json = r#"{
        "environment": "production",
        "unknown_field": 12345,
        "nested_unknown": {"key": "value"}
    }"#;
    tokio::fs::write(&file_path, json).await.unwrap();

    let loaded: Settings = load_json(&file_path).await.unwrap();
    assert_eq!(loaded.environment, "production");
}

// ============================================================================
// Settings Store
// ============================================================================

#[tokio::test]
async fn test_store_missing_file_is_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let store = SettingsStore::load(temp_dir.path().join("settings.json"))
        .await
        .unwrap();

    assert_eq!(store.get().await, Settings::default());
}

#[tokio::test]
async fn test_store_invalid_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("settings.json");
    tokio::fs::write(&file_path, "{ not json").await.unwrap();

    assert!(SettingsStore::load(file_path).await.is_err());
}

#[tokio::test]
async fn test_store_update_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("conf").join("settings.json");

    let store = SettingsStore::new(file_path.clone());
    store
        .update(|s| {
            s.default_location = Some("78701".into());
            s.credential_backend = CredentialBackend::Memory;
        })
        .await;
    store.save().await.unwrap();

    let reloaded = SettingsStore::load(file_path).await.unwrap().get().await;
    assert_eq!(reloaded.default_location.as_deref(), Some("78701"));
    assert_eq!(reloaded.credential_backend, CredentialBackend::Memory);
}
