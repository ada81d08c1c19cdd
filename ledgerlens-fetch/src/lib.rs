// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LedgerLens` Fetch
//!
//! Network and credential plumbing shared by the upstream integrations.
//!
//! ## Host APIs
//!
//! The [`host`] module provides the credential storage capability:
//!
//! - [`host::credentials`] - [`CredentialStore`] trait and in-memory backend
//! - [`host::keychain`] - OS keychain backend
//!
//! ## HTTP
//!
//! - [`client::HttpClient`] - Timeout-bound client with status mapping
//! - [`retry::RetryStrategy`] - Bounded exponential backoff with jitter
//!
//! ## Sessions
//!
//! - [`session::TokenLifecycleManager`] - Expiry checks, refresh, and the
//!   single refresh-and-retry on a rejected token
//!
//! ## Example
//!
//! ```ignore
//! use ledgerlens_fetch::{MemoryCredentialStore, TokenLifecycleManager};
//!
//! let manager = TokenLifecycleManager::new(Arc::new(store), Arc::new(token_client));
//! let report = manager
//!     .with_session("default", |session| client.fetch(session, &request))
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub mod host;
pub mod retry;
pub mod session;

// Errors
pub use error::{CredentialStoreError, FetchError};

// Host APIs
pub use host::{CredentialStore, KeychainCredentialStore, MemoryCredentialStore};

// HTTP
pub use client::HttpClient;
pub use retry::RetryStrategy;

// Sessions
pub use session::{Session, TokenLifecycleManager, TokenRefresher, REFRESH_EXPIRY_WARNING_SECS};
