//! Host APIs for credential storage.
//!
//! - [`credentials`] - The [`CredentialStore`] capability and an in-memory backend
//! - [`keychain`] - OS keychain backend

pub mod credentials;
pub mod keychain;

// Re-export key types
pub use credentials::{CredentialStore, MemoryCredentialStore};
pub use keychain::KeychainCredentialStore;
