//! Credential storage in the system keychain.
//!
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Each context is one keychain entry under the service `ledgerlens:<context>`
//! whose secret is the JSON-encoded [`Credential`].

use async_trait::async_trait;
use keyring::Entry;
use ledgerlens_core::Credential;
use tracing::{debug, warn};

use super::credentials::CredentialStore;
use crate::error::CredentialStoreError;

/// Service name prefix for `LedgerLens` credentials.
const SERVICE_PREFIX: &str = "ledgerlens";

/// Account name every entry is stored under.
const ACCOUNT: &str = "oauth_credential";

// ============================================================================
// Keychain Credential Store
// ============================================================================

/// [`CredentialStore`] backed by the OS keychain via the `keyring` crate.
#[derive(Debug, Clone, Default)]
pub struct KeychainCredentialStore;

impl KeychainCredentialStore {
    /// Creates a new keychain store.
    pub fn new() -> Self {
        Self
    }

    /// Builds the full service name with prefix.
    fn full_service(context: &str) -> String {
        format!("{SERVICE_PREFIX}:{context}")
    }

    /// Creates a keyring entry.
    fn entry(context: &str) -> Result<Entry, CredentialStoreError> {
        Entry::new(&Self::full_service(context), ACCOUNT)
            .map_err(|e| CredentialStoreError::Platform(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn get(&self, context: &str) -> Result<Option<Credential>, CredentialStoreError> {
        debug!(context = %context, "Getting credential from keychain");

        match Self::entry(context)?.get_password() {
            Ok(secret) if secret.is_empty() => Ok(None),
            Ok(secret) => Ok(Some(serde_json::from_str(&secret)?)),
            Err(keyring::Error::NoEntry) => {
                debug!(context = %context, "Credential not found");
                Ok(None)
            }
            Err(e) => {
                warn!(context = %context, error = %e, "Failed to get credential");
                Err(e.into())
            }
        }
    }

    async fn put(
        &self,
        context: &str,
        credential: &Credential,
    ) -> Result<(), CredentialStoreError> {
        debug!(context = %context, "Setting credential in keychain");

        let secret = serde_json::to_string(credential)?;
        Self::entry(context)?.set_password(&secret).map_err(|e| {
            warn!(context = %context, error = %e, "Failed to set credential");
            CredentialStoreError::from(e)
        })
    }

    async fn delete(&self, context: &str) -> Result<(), CredentialStoreError> {
        debug!(context = %context, "Deleting credential from keychain");

        match Self::entry(context)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!(context = %context, error = %e, "Failed to delete credential");
                Err(e.into())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_service_name() {
        assert_eq!(
            KeychainCredentialStore::full_service("default"),
            "ledgerlens:default"
        );
        assert_eq!(
            KeychainCredentialStore::full_service("sandbox"),
            "ledgerlens:sandbox"
        );
    }

    // Actual keychain access needs a platform secret service and is left to
    // manual runs.
}
