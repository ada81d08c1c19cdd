//! OAuth credential types.
//!
//! This module contains the bearer-token credential and its lifecycle state:
//! - [`Credential`] - Realm id, tokens, and absolute expiry
//! - [`TokenBundle`] - Token endpoint response
//! - [`CredentialState`] - Missing / valid / expired

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Constants
// ============================================================================

/// Seconds subtracted from the declared token lifetime.
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 30;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

fn default_expires_in() -> i64 {
    DEFAULT_EXPIRES_IN_SECS
}

// ============================================================================
// Token Bundle
// ============================================================================

/// Token endpoint response body.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// New access token.
    pub access_token: String,
    /// Refresh token to use next time. May differ from the one sent.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    /// Refresh token lifetime in seconds.
    #[serde(default)]
    pub x_refresh_token_expires_in: Option<i64>,
    /// Token type (normally "bearer").
    #[serde(default)]
    pub token_type: Option<String>,
}

impl fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBundle")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("x_refresh_token_expires_in", &self.x_refresh_token_expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

// ============================================================================
// Credential
// ============================================================================

/// A stored credential set for one caller context.
///
/// `expires_at` is absolute (epoch seconds) and already includes the
/// [`EXPIRY_SAFETY_MARGIN_SECS`] margin.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Company (realm) id the tokens were issued for.
    pub realm_id: String,
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Access token expiry, epoch seconds.
    pub expires_at: i64,
    /// Refresh token expiry, epoch seconds, when the endpoint reported one.
    #[serde(default)]
    pub refresh_expires_at: Option<i64>,
}

impl Credential {
    /// Builds a credential from a token endpoint response issued at `issued_at`.
    pub fn from_bundle(realm_id: impl Into<String>, bundle: &TokenBundle, issued_at: i64) -> Self {
        Self {
            realm_id: realm_id.into(),
            access_token: bundle.access_token.clone(),
            refresh_token: bundle.refresh_token.clone(),
            expires_at: issued_at + bundle.expires_in - EXPIRY_SAFETY_MARGIN_SECS,
            refresh_expires_at: bundle.x_refresh_token_expires_in.map(|s| issued_at + s),
        }
    }

    /// Returns true when a realm id and an access token are both present.
    pub fn is_complete(&self) -> bool {
        !self.realm_id.is_empty() && !self.access_token.is_empty()
    }

    /// Returns true once `now` has reached the expiry instant.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Seconds until the access token expires (negative once expired).
    pub fn seconds_remaining(&self, now: i64) -> i64 {
        self.expires_at - now
    }

    /// Returns true if the refresh token is known to expire within `window` seconds.
    pub fn refresh_expires_within(&self, now: i64, window: i64) -> bool {
        self.refresh_expires_at.is_some_and(|at| at - now <= window)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("realm_id", &self.realm_id)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish()
    }
}

// ============================================================================
// Credential State
// ============================================================================

/// Lifecycle state of the stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
    /// No realm id or no access token stored.
    Missing,
    /// Access token usable until its expiry instant.
    Valid,
    /// Access token expired; a refresh is needed before fetching.
    Expired,
}

impl CredentialState {
    /// Classifies an optional stored credential at `now`.
    pub fn of(credential: Option<&Credential>, now: i64) -> Self {
        match credential {
            Some(c) if c.is_complete() => {
                if c.is_expired(now) {
                    Self::Expired
                } else {
                    Self::Valid
                }
            }
            _ => Self::Missing,
        }
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Missing => "missing",
            Self::Valid => "valid",
            Self::Expired => "expired",
        })
    }
}

/// Checks that a realm id is the numeric company id.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRealmId`] for empty or non-numeric ids.
pub fn validate_realm_id(realm_id: &str) -> Result<(), CoreError> {
    if !realm_id.is_empty() && realm_id.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CoreError::InvalidRealmId(realm_id.to_string()))
    }
}
