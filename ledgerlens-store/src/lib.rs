// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LedgerLens` Store
//!
//! Local state for `LedgerLens`.
//!
//! This crate provides:
//!
//! - **Settings**: user preferences in `settings.json`, overridable from the
//!   environment
//! - **`FileCredentialStore`**: OAuth credentials in `credentials.json`
//! - **Persistence**: atomic, owner-only JSON file helpers
//!
//! ## Usage
//!
//! ```ignore
//! use ledgerlens_store::{open_credential_store, SettingsStore};
//!
//! let store = SettingsStore::load_default().await?;
//! let settings = store.effective().await;
//! let credentials = open_credential_store(
//!     settings.credential_backend,
//!     default_credentials_path(),
//! );
//! ```

pub mod credential_file;
pub mod error;
pub mod persistence;
pub mod settings;

pub use credential_file::{open_credential_store, FileCredentialStore};
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_credentials_path, default_settings_path, load_json,
    load_json_or_default, save_json,
};
pub use settings::{CredentialBackend, LogLevel, Settings, SettingsStore};

#[cfg(test)]
mod persistence_tests;
