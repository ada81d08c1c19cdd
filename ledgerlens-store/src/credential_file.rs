//! File-backed credential store.
//!
//! One JSON object maps context to credential:
//!
//! ```json
//! {"default": {"realm_id": "4620816365", "access_token": "...", ...}}
//! ```
//!
//! The file is rewritten whole on every change, atomically and with 0o600.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use ledgerlens_core::Credential;
use ledgerlens_fetch::{
    CredentialStore, CredentialStoreError, KeychainCredentialStore, MemoryCredentialStore,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::{default_credentials_path, load_json, remove_file, save_json};
use crate::settings::CredentialBackend;

type CredentialMap = BTreeMap<String, Credential>;

/// Credential store persisted as a JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Creates a store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates a store at the default location in the config dir.
    pub fn at_default_path() -> Self {
        Self::new(default_credentials_path())
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lists the stored contexts.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn contexts(&self) -> Result<Vec<String>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.into_keys().collect())
    }

    async fn read_map(&self) -> Result<CredentialMap, CredentialStoreError> {
        match load_json(&self.path).await {
            Ok(map) => Ok(map),
            Err(e) if e.is_not_found() => Ok(CredentialMap::new()),
            Err(e) => Err(into_store_error(e)),
        }
    }

    async fn write_map(&self, map: &CredentialMap) -> Result<(), CredentialStoreError> {
        if map.is_empty() {
            return remove_file(&self.path).await.map_err(into_store_error);
        }
        save_json(&self.path, map).await.map_err(into_store_error)
    }
}

fn into_store_error(error: StoreError) -> CredentialStoreError {
    match error {
        StoreError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            CredentialStoreError::AccessDenied
        }
        StoreError::Io(e) => CredentialStoreError::Io(e),
        StoreError::Serialization(e) => CredentialStoreError::Corrupt(e),
        other => CredentialStoreError::Other(other.to_string()),
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, context: &str) -> Result<Option<Credential>, CredentialStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(context))
    }

    async fn put(
        &self,
        context: &str,
        credential: &Credential,
    ) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(context.to_string(), credential.clone());
        self.write_map(&map).await?;
        debug!(context = %context, path = %self.path.display(), "Stored credential");
        Ok(())
    }

    async fn delete(&self, context: &str) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(context).is_some() {
            self.write_map(&map).await?;
            debug!(context = %context, "Deleted credential");
        }
        Ok(())
    }
}

/// Opens the credential store selected by `backend`. `file_path` is used by
/// the file backend only.
pub fn open_credential_store(
    backend: CredentialBackend,
    file_path: impl Into<PathBuf>,
) -> Arc<dyn CredentialStore> {
    debug!(backend = %backend, "Opening credential store");
    match backend {
        CredentialBackend::File => Arc::new(FileCredentialStore::new(file_path)),
        CredentialBackend::Keychain => Arc::new(KeychainCredentialStore::new()),
        CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
    }
}
