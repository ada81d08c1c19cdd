// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `LedgerLens` Core
//!
//! Core types, report normalization, and traits for the `LedgerLens`
//! workspace.
//!
//! This crate has no network or storage dependencies. It provides:
//!
//! - Domain models (credentials, period keys)
//! - The report normalizer (flat and matrix views)
//! - Error types
//! - The [`Clock`] seam used by credential expiry checks
//!
//! ## Key Types
//!
//! ### Credentials
//! - [`Credential`] - Realm id, tokens, absolute expiry
//! - [`TokenBundle`] - Token endpoint response
//! - [`CredentialState`] - Missing / valid / expired
//!
//! ### Periods
//! - [`PeriodKey`] - Canonical month code (`Jan..Dec`)
//! - [`ColumnKey`] - Report column bucket
//!
//! ### Reports
//! - [`report::ReportDocument`] - Upstream report JSON
//! - [`report::ReportMatrix`] - Row-preserving projection
//! - [`report::aggregate`] - Per-month sums

pub mod error;
pub mod models;
pub mod report;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    validate_realm_id, ColumnKey, Credential, CredentialState, PeriodKey, TokenBundle,
    DEFAULT_EXPIRES_IN_SECS, EXPIRY_SAFETY_MARGIN_SECS,
};

// Re-export traits
pub use traits::{Clock, FixedClock, SystemClock};
