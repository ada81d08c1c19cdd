//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for every network and credential operation.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limited by the upstream.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after: Option<u64>,
    },

    /// The upstream rejected the access token (HTTP 401).
    #[error("Access token rejected by upstream")]
    Unauthorized,

    /// No usable credential; the user must authorize again.
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// Exchanging the refresh token failed.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Upstream answered with an unexpected status.
    #[error("Upstream returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Invalid response from the upstream.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] ledgerlens_core::CoreError),

    /// Credential store error.
    #[error("Credential store error: {0}")]
    Store(#[from] CredentialStoreError),

    /// Missing or invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FetchError {
    /// Returns true when the only way forward is a fresh authorization.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::NotAuthenticated(_) | Self::RefreshFailed(_))
    }

    /// Returns true for failures worth retrying: connection errors,
    /// timeouts, rate limiting and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout(_) | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

// ============================================================================
// Credential Store Error
// ============================================================================

/// Error type for credential store backends.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    /// Access denied.
    #[error("Access denied to credential store")]
    AccessDenied,

    /// Backend unavailable.
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    /// Platform error.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Stored entry could not be decoded.
    #[error("Corrupt credential entry: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("Credential store error: {0}")]
    Other(String),
}

impl From<keyring::Error> for CredentialStoreError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::Ambiguous(_) => {
                CredentialStoreError::Other("Ambiguous credential entry".to_string())
            }
            keyring::Error::PlatformFailure(e) => CredentialStoreError::Platform(e.to_string()),
            keyring::Error::NoStorageAccess(_) => CredentialStoreError::AccessDenied,
            _ => CredentialStoreError::Other(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reauthentication_classification() {
        assert!(FetchError::NotAuthenticated("none".into()).requires_reauthentication());
        assert!(FetchError::RefreshFailed("400".into()).requires_reauthentication());
        assert!(!FetchError::Unauthorized.requires_reauthentication());
        assert!(!FetchError::Timeout(10).requires_reauthentication());
    }

    #[test]
    fn test_transient_classification() {
        let unavailable = FetchError::Status {
            status: 503,
            body: String::new(),
        };
        let bad_request = FetchError::Status {
            status: 400,
            body: String::new(),
        };
        assert!(unavailable.is_transient());
        assert!(!bad_request.is_transient());
        assert!(FetchError::RateLimited { retry_after: None }.is_transient());
        assert!(!FetchError::Unauthorized.is_transient());
        assert!(!FetchError::Config("missing".into()).is_transient());
    }
}
