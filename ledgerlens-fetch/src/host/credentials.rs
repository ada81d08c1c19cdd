//! Credential storage capability.
//!
//! The token lifecycle manager never touches a concrete backend; it is handed
//! an `Arc<dyn CredentialStore>`. Backends:
//!
//! - [`MemoryCredentialStore`] - process-local, used in tests and one-shot runs
//! - [`super::keychain::KeychainCredentialStore`] - OS keychain
//! - `FileCredentialStore` in `ledgerlens-store` - JSON file in the config dir
//!
//! A "context" names one credential slot, e.g. `"default"` or a realm alias.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ledgerlens_core::Credential;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::CredentialStoreError;

// ============================================================================
// Credential Store Trait
// ============================================================================

/// Read/write access to persisted credentials, keyed by context.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Loads the credential for `context`.
    ///
    /// # Returns
    /// * `Ok(Some(credential))` - Credential found
    /// * `Ok(None)` - Nothing stored for this context
    /// * `Err(e)` - Backend failure
    async fn get(&self, context: &str) -> Result<Option<Credential>, CredentialStoreError>;

    /// Stores `credential` for `context`, replacing any previous entry.
    async fn put(&self, context: &str, credential: &Credential)
    -> Result<(), CredentialStoreError>;

    /// Removes the entry for `context`. Removing a missing entry is not an error.
    async fn delete(&self, context: &str) -> Result<(), CredentialStoreError>;

    /// Check if a credential exists.
    async fn exists(&self, context: &str) -> bool {
        matches!(self.get(context).await, Ok(Some(_)))
    }
}

// ============================================================================
// In-Memory Backend
// ============================================================================

/// Process-local credential store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<RwLock<HashMap<String, Credential>>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one credential.
    pub fn with_credential(context: &str, credential: Credential) -> Self {
        let mut entries = HashMap::new();
        entries.insert(context.to_string(), credential);
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, context: &str) -> Result<Option<Credential>, CredentialStoreError> {
        Ok(self.entries.read().await.get(context).cloned())
    }

    async fn put(
        &self,
        context: &str,
        credential: &Credential,
    ) -> Result<(), CredentialStoreError> {
        debug!(context = %context, "Storing credential in memory");
        self.entries
            .write()
            .await
            .insert(context.to_string(), credential.clone());
        Ok(())
    }

    async fn delete(&self, context: &str) -> Result<(), CredentialStoreError> {
        self.entries.write().await.remove(context);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(access: &str) -> Credential {
        Credential {
            realm_id: "123".to_string(),
            access_token: access.to_string(),
            refresh_token: "rt".to_string(),
            expires_at: 100,
            refresh_expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert!(store.get("default").await.unwrap().is_none());
        assert!(!store.exists("default").await);

        store.put("default", &credential("a")).await.unwrap();
        assert_eq!(
            store.get("default").await.unwrap().unwrap().access_token,
            "a"
        );

        store.put("default", &credential("b")).await.unwrap();
        assert_eq!(
            store.get("default").await.unwrap().unwrap().access_token,
            "b"
        );

        store.delete("default").await.unwrap();
        store.delete("default").await.unwrap();
        assert!(store.get("default").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_contexts_are_isolated() {
        let store = MemoryCredentialStore::with_credential("a", credential("x"));
        let shared = store.clone();

        assert!(shared.exists("a").await);
        assert!(!shared.exists("b").await);
    }
}
