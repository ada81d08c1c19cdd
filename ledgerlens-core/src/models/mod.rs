//! Domain models for `LedgerLens`.
//!
//! ## Submodules
//!
//! - [`credential`] - OAuth credential, token bundle, lifecycle state
//! - [`period`] - Canonical month keys and column buckets

mod credential;
mod period;

pub use credential::{
    validate_realm_id, Credential, CredentialState, TokenBundle, DEFAULT_EXPIRES_IN_SECS,
    EXPIRY_SAFETY_MARGIN_SECS,
};
pub use period::{ColumnKey, PeriodKey};
