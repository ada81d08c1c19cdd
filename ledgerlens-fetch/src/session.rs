//! Token lifecycle: expiry checks, refresh, and the single reactive retry.
//!
//! [`TokenLifecycleManager`] owns no tokens itself. Every call reads the
//! current credential from the injected [`CredentialStore`], so a refresh
//! done by one caller is seen by the next.
//!
//! Refreshes for the same context are not serialized here; callers that
//! share a context across tasks must do that themselves.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use ledgerlens_core::{Clock, Credential, CredentialState, SystemClock, TokenBundle};
use tracing::{debug, info, instrument, warn};

use crate::error::FetchError;
use crate::host::CredentialStore;

/// Warn when the refresh token itself has less than this left (30 days).
pub const REFRESH_EXPIRY_WARNING_SECS: i64 = 30 * 24 * 60 * 60;

// ============================================================================
// Token Refresher
// ============================================================================

/// Exchanges a refresh token for a new token bundle.
///
/// Implemented by the OAuth token endpoint client; tests use fakes.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Performs one refresh exchange. No retries.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, FetchError>;
}

// ============================================================================
// Session
// ============================================================================

/// What a report fetch needs: the company id and a bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Company (realm) id.
    pub realm_id: String,
    /// Access token to send as `Bearer`.
    pub access_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("realm_id", &self.realm_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl From<&Credential> for Session {
    fn from(credential: &Credential) -> Self {
        Self {
            realm_id: credential.realm_id.clone(),
            access_token: credential.access_token.clone(),
        }
    }
}

// ============================================================================
// Token Lifecycle Manager
// ============================================================================

/// Keeps the stored credential usable.
#[derive(Clone)]
pub struct TokenLifecycleManager {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenLifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenLifecycleManager").finish_non_exhaustive()
    }
}

impl TokenLifecycleManager {
    /// Creates a manager on the system clock.
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the credential store.
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Loads the stored credential for `context`.
    pub async fn credential(&self, context: &str) -> Result<Option<Credential>, FetchError> {
        Ok(self.store.get(context).await?)
    }

    /// Classifies the stored credential.
    pub async fn state(&self, context: &str) -> Result<CredentialState, FetchError> {
        let credential = self.credential(context).await?;
        Ok(CredentialState::of(credential.as_ref(), self.clock.now_epoch()))
    }

    /// Returns a usable session, refreshing first when the token expired.
    ///
    /// # Errors
    ///
    /// [`FetchError::NotAuthenticated`] when nothing usable is stored,
    /// [`FetchError::RefreshFailed`] when the proactive refresh fails.
    pub async fn ensure_valid(&self, context: &str) -> Result<Session, FetchError> {
        let credential = self.credential(context).await?;
        let now = self.clock.now_epoch();

        match CredentialState::of(credential.as_ref(), now) {
            CredentialState::Missing => Err(FetchError::NotAuthenticated(format!(
                "no credential stored for '{context}'"
            ))),
            CredentialState::Expired => {
                debug!(context = %context, "Access token expired, refreshing");
                let refreshed = self.refresh(context).await?;
                Ok(Session::from(&refreshed))
            }
            CredentialState::Valid => match credential {
                Some(c) => Ok(Session::from(&c)),
                None => Err(FetchError::NotAuthenticated(format!(
                    "no credential stored for '{context}'"
                ))),
            },
        }
    }

    /// Exchanges the stored refresh token and persists the new credential.
    ///
    /// Every token field is overwritten. A failed exchange leaves the stored
    /// credential untouched and surfaces as [`FetchError::RefreshFailed`].
    #[instrument(skip(self))]
    pub async fn refresh(&self, context: &str) -> Result<Credential, FetchError> {
        let current = self
            .credential(context)
            .await?
            .filter(|c| !c.refresh_token.is_empty())
            .ok_or_else(|| {
                FetchError::NotAuthenticated(format!("no refresh token stored for '{context}'"))
            })?;

        let bundle = match self.refresher.refresh(&current.refresh_token).await {
            Ok(bundle) => bundle,
            Err(e @ FetchError::RefreshFailed(_)) => return Err(e),
            Err(e) => return Err(FetchError::RefreshFailed(e.to_string())),
        };

        let refreshed = self.persist(context, &current.realm_id, &bundle).await?;
        info!(context = %context, "Access token refreshed");
        Ok(refreshed)
    }

    /// Persists a freshly issued bundle, e.g. after an authorization-code
    /// exchange.
    pub async fn store_bundle(
        &self,
        context: &str,
        realm_id: &str,
        bundle: &TokenBundle,
    ) -> Result<Credential, FetchError> {
        ledgerlens_core::validate_realm_id(realm_id)?;
        self.persist(context, realm_id, bundle).await
    }

    /// Runs `fetch` with a valid session.
    ///
    /// If `fetch` reports [`FetchError::Unauthorized`], the token is refreshed
    /// exactly once and `fetch` runs again with the realm id re-read from the
    /// store. A second rejection becomes [`FetchError::NotAuthenticated`].
    pub async fn with_session<T, F, Fut>(
        &self,
        context: &str,
        mut fetch: F,
    ) -> Result<T, FetchError>
    where
        F: FnMut(Session) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let session = self.ensure_valid(context).await?;

        match fetch(session).await {
            Err(FetchError::Unauthorized) => {
                warn!(context = %context, "Access token rejected, refreshing once");
                let refreshed = self.refresh(context).await?;

                let realm_id = self
                    .credential(context)
                    .await?
                    .map(|c| c.realm_id)
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| refreshed.realm_id.clone());
                let retry = Session {
                    realm_id,
                    access_token: refreshed.access_token,
                };

                match fetch(retry).await {
                    Err(FetchError::Unauthorized) => Err(FetchError::NotAuthenticated(
                        "access token rejected right after refresh".to_string(),
                    )),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn persist(
        &self,
        context: &str,
        realm_id: &str,
        bundle: &TokenBundle,
    ) -> Result<Credential, FetchError> {
        let now = self.clock.now_epoch();
        let credential = Credential::from_bundle(realm_id, bundle, now);

        if credential.refresh_expires_within(now, REFRESH_EXPIRY_WARNING_SECS) {
            warn!(
                context = %context,
                "Refresh token expires within 30 days; authorize again soon"
            );
        }

        self.store.put(context, &credential).await?;
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryCredentialStore;
    use ledgerlens_core::FixedClock;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    const T: i64 = 1_700_000_000;

    /// Hands out numbered access tokens and counts calls.
    struct FakeRefresher {
        calls: AtomicU32,
        fail: bool,
    }

    impl FakeRefresher {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: true,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for FakeRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<TokenBundle, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(FetchError::Status {
                    status: 400,
                    body: "invalid_grant".to_string(),
                });
            }
            Ok(TokenBundle {
                access_token: format!("access-{n}"),
                refresh_token: format!("{refresh_token}-next"),
                expires_in: 3600,
                x_refresh_token_expires_in: None,
                token_type: Some("bearer".to_string()),
            })
        }
    }

    fn stored(expires_at: i64) -> Credential {
        Credential {
            realm_id: "4620816365".to_string(),
            access_token: "access-0".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
            refresh_expires_at: None,
        }
    }

    fn manager(
        store: MemoryCredentialStore,
        refresher: Arc<FakeRefresher>,
        clock: Arc<FixedClock>,
    ) -> TokenLifecycleManager {
        TokenLifecycleManager::new(Arc::new(store), refresher).with_clock(clock)
    }

    /// A fetch that answers with the given statuses in order.
    fn scripted(statuses: &[u16]) -> (Arc<Mutex<VecDeque<u16>>>, Arc<Mutex<Vec<Session>>>) {
        (
            Arc::new(Mutex::new(statuses.iter().copied().collect())),
            Arc::new(Mutex::new(Vec::new())),
        )
    }

    async fn run_scripted(
        manager: &TokenLifecycleManager,
        script: &(Arc<Mutex<VecDeque<u16>>>, Arc<Mutex<Vec<Session>>>),
    ) -> Result<&'static str, FetchError> {
        manager
            .with_session("default", |session| {
                let statuses = Arc::clone(&script.0);
                let seen = Arc::clone(&script.1);
                async move {
                    seen.lock().unwrap().push(session);
                    match statuses.lock().unwrap().pop_front() {
                        Some(401) => Err(FetchError::Unauthorized),
                        _ => Ok("report"),
                    }
                }
            })
            .await
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let clock = Arc::new(FixedClock::at(T));
        let store = MemoryCredentialStore::new();
        let manager = manager(store.clone(), FakeRefresher::ok(), Arc::clone(&clock));

        assert_eq!(manager.state("default").await.unwrap(), CredentialState::Missing);

        store.put("default", &stored(T + 100)).await.unwrap();
        assert_eq!(manager.state("default").await.unwrap(), CredentialState::Valid);

        clock.advance(100);
        assert_eq!(manager.state("default").await.unwrap(), CredentialState::Expired);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_refresh() {
        let refresher = FakeRefresher::ok();
        let manager = manager(
            MemoryCredentialStore::new(),
            Arc::clone(&refresher),
            Arc::new(FixedClock::at(T)),
        );

        let err = manager.ensure_valid("default").await.unwrap_err();
        assert!(err.requires_reauthentication());
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_sets_expiry_with_safety_margin() {
        let store = MemoryCredentialStore::with_credential("default", stored(T - 1));
        let manager = manager(store.clone(), FakeRefresher::ok(), Arc::new(FixedClock::at(T)));

        let refreshed = manager.refresh("default").await.unwrap();
        assert_eq!(refreshed.expires_at, T + 3600 - 30);
        assert_eq!(refreshed.access_token, "access-1");
        assert_eq!(refreshed.refresh_token, "refresh-next");
        assert_eq!(refreshed.realm_id, "4620816365");

        let persisted = store.get("default").await.unwrap().unwrap();
        assert_eq!(persisted, refreshed);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_before_fetch() {
        let refresher = FakeRefresher::ok();
        let store = MemoryCredentialStore::with_credential("default", stored(T));
        let manager = manager(store, Arc::clone(&refresher), Arc::new(FixedClock::at(T)));

        let session = manager.ensure_valid("default").await.unwrap();
        assert_eq!(session.access_token, "access-1");
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn test_valid_token_is_used_as_is() {
        let refresher = FakeRefresher::ok();
        let store = MemoryCredentialStore::with_credential("default", stored(T + 600));
        let manager = manager(store, Arc::clone(&refresher), Arc::new(FixedClock::at(T)));

        let session = manager.ensure_valid("default").await.unwrap();
        assert_eq!(session.access_token, "access-0");
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_then_ok_refreshes_once() {
        let refresher = FakeRefresher::ok();
        let store = MemoryCredentialStore::with_credential("default", stored(T + 600));
        let manager = manager(store, Arc::clone(&refresher), Arc::new(FixedClock::at(T)));
        let script = scripted(&[401, 200]);

        let result = run_scripted(&manager, &script).await.unwrap();

        assert_eq!(result, "report");
        assert_eq!(refresher.calls(), 1);
        let seen = script.1.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].access_token, "access-0");
        assert_eq!(seen[1].access_token, "access-1");
        assert_eq!(seen[1].realm_id, "4620816365");
    }

    #[tokio::test]
    async fn test_unauthorized_twice_is_auth_error_without_third_attempt() {
        let refresher = FakeRefresher::ok();
        let store = MemoryCredentialStore::with_credential("default", stored(T + 600));
        let manager = manager(store, Arc::clone(&refresher), Arc::new(FixedClock::at(T)));
        let script = scripted(&[401, 401, 200]);

        let err = run_scripted(&manager, &script).await.unwrap_err();

        assert!(matches!(err, FetchError::NotAuthenticated(_)));
        assert!(err.requires_reauthentication());
        assert_eq!(refresher.calls(), 1);
        assert_eq!(script.1.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_is_fatal_and_keeps_stored_tokens() {
        let store = MemoryCredentialStore::with_credential("default", stored(T));
        let manager = manager(
            store.clone(),
            FakeRefresher::failing(),
            Arc::new(FixedClock::at(T)),
        );
        let script = scripted(&[200]);

        let err = run_scripted(&manager, &script).await.unwrap_err();

        assert!(matches!(err, FetchError::RefreshFailed(_)));
        assert!(script.1.lock().unwrap().is_empty());
        let persisted = store.get("default").await.unwrap().unwrap();
        assert_eq!(persisted.access_token, "access-0");
    }

    #[tokio::test]
    async fn test_store_bundle_validates_realm() {
        let manager = manager(
            MemoryCredentialStore::new(),
            FakeRefresher::ok(),
            Arc::new(FixedClock::at(T)),
        );
        let bundle = TokenBundle {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 3600,
            x_refresh_token_expires_in: Some(8_726_400),
            token_type: None,
        };

        assert!(manager.store_bundle("default", "abc", &bundle).await.is_err());

        let credential = manager
            .store_bundle("default", "123", &bundle)
            .await
            .unwrap();
        assert_eq!(credential.refresh_expires_at, Some(T + 8_726_400));
        assert_eq!(manager.state("default").await.unwrap(), CredentialState::Valid);
    }
}
