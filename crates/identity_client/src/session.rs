//! Session state and the operations that drive it. The controller owns the
//! "current user" belief, broadcasts every change to observers over a watch
//! channel, and keeps tokens in a pluggable [`TokenStore`].
//!
//! Completions carry a ticket so a response from an abandoned operation
//! never overwrites state written by a later, already-completed one.

use crate::api::IdentityApi;
use crate::error::Error;
use crate::store::TokenStore;
use crate::types::{Credentials, ProfileUpdate, Registration, TokenPair, UserRecord};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tracing::warn;

/// Result of a profile update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    Updated(UserRecord),
    /// Nothing was provided, so nothing was sent.
    NoChanges,
}

pub struct SessionController {
    api: IdentityApi,
    store: Arc<dyn TokenStore>,
    user_tx: watch::Sender<Option<UserRecord>>,
    issued: AtomicU64,
    applied: AtomicU64,
    clock: Arc<dyn Fn() -> i64 + Send + Sync>,
}

impl SessionController {
    #[must_use]
    pub fn new(api: IdentityApi, store: Arc<dyn TokenStore>) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            api,
            store,
            user_tx,
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            clock: Arc::new(unix_now),
        }
    }

    /// Replace the expiry clock, used by tests for deterministic decisions.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Observe user-state changes. Receivers see the latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<UserRecord>> {
        self.user_tx.subscribe()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserRecord> {
        self.user_tx.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_tx.borrow().is_some()
    }

    /// Exchange credentials for a session.
    ///
    /// On success both tokens and the user snapshot are replaced wholesale.
    /// On failure the session is left unauthenticated and the normalized
    /// API message is returned.
    ///
    /// # Errors
    ///
    /// Returns the normalized API message or a transport error.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserRecord, Error> {
        let ticket = self.begin();
        match self.api.login(credentials).await {
            Ok(payload) => {
                self.commit(ticket, || {
                    self.store.store_pair(&TokenPair {
                        access: payload.access.clone(),
                        refresh: payload.refresh.clone(),
                    });
                    self.user_tx.send_replace(Some(payload.user.clone()));
                });
                Ok(payload.user)
            }
            Err(err) => {
                self.commit(ticket, || {
                    self.user_tx.send_replace(None);
                });
                Err(err)
            }
        }
    }

    /// Create an account and open a session, login-shaped.
    ///
    /// Mismatched password confirmation is rejected here, before any
    /// network call.
    ///
    /// # Errors
    ///
    /// Returns a validation error on mismatch, otherwise as [`Self::login`].
    pub async fn register(&self, registration: &Registration) -> Result<UserRecord, Error> {
        if !registration.passwords_match() {
            return Err(Error::Validation("Passwords do not match.".to_string()));
        }
        let ticket = self.begin();
        match self.api.register(registration).await {
            Ok(payload) => {
                self.commit(ticket, || {
                    self.store.store_pair(&TokenPair {
                        access: payload.access.clone(),
                        refresh: payload.refresh.clone(),
                    });
                    self.user_tx.send_replace(Some(payload.user.clone()));
                });
                Ok(payload.user)
            }
            Err(err) => {
                self.commit(ticket, || {
                    self.user_tx.send_replace(None);
                });
                Err(err)
            }
        }
    }

    /// End the session. The API notification is best-effort; local state is
    /// cleared no matter what.
    pub async fn logout(&self) {
        let ticket = self.begin();
        if let Some(refresh) = self.store.refresh_token() {
            let access = self.store.access_token();
            if let Err(err) = self.api.logout(access.as_deref(), &refresh).await {
                warn!("Logout notification failed: {err}");
            }
        }
        self.commit(ticket, || {
            self.store.clear();
            self.user_tx.send_replace(None);
        });
    }

    /// Re-fetch the current user with the stored token, refreshing it once
    /// if expired. Any failure silently degrades to an unauthenticated
    /// session.
    pub async fn refresh_user(&self) -> Option<UserRecord> {
        let ticket = self.begin();
        let Some(access) = self.ensure_valid_token().await else {
            self.commit(ticket, || {
                self.store.clear();
                self.user_tx.send_replace(None);
            });
            return None;
        };
        match self.api.current_user(&access).await {
            Ok(user) => {
                self.commit(ticket, || {
                    self.user_tx.send_replace(Some(user.clone()));
                });
                Some(user)
            }
            Err(err) => {
                warn!("Failed to fetch current user: {err}");
                self.commit(ticket, || {
                    self.store.clear();
                    self.user_tx.send_replace(None);
                });
                None
            }
        }
    }

    /// Send only the provided fields; an empty update never leaves the
    /// process. On success the user snapshot is replaced wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] without a usable token, otherwise
    /// the normalized API message or a transport error.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProfileOutcome, Error> {
        if update.is_empty() {
            return Ok(ProfileOutcome::NoChanges);
        }
        let ticket = self.begin();
        let access = self
            .ensure_valid_token()
            .await
            .ok_or(Error::Unauthenticated)?;
        let user = self.api.update_profile(&access, update).await?;
        self.commit(ticket, || {
            self.user_tx.send_replace(Some(user.clone()));
        });
        Ok(ProfileOutcome::Updated(user))
    }

    /// A usable access token, refreshing once when the stored one has
    /// expired. A failed or impossible refresh clears the store.
    pub async fn ensure_valid_token(&self) -> Option<String> {
        let access = self.store.access_token()?;
        if !identity_token::is_expired(&access, (self.clock)()) {
            return Some(access);
        }
        match self.store.refresh_token() {
            Some(refresh) => match self.api.refresh(&refresh).await {
                Ok(new_access) => {
                    self.store.store_access(&new_access);
                    Some(new_access)
                }
                Err(err) => {
                    warn!("Token refresh failed: {err}");
                    self.store.clear();
                    None
                }
            },
            None => {
                self.store.clear();
                None
            }
        }
    }

    fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a completion unless a later-ticketed operation already did.
    fn commit(&self, ticket: u64, apply: impl FnOnce()) -> bool {
        let previous = self.applied.fetch_max(ticket, Ordering::SeqCst);
        if previous < ticket {
            apply();
            true
        } else {
            false
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn controller() -> SessionController {
        let api = IdentityApi::new("http://identity.invalid").expect("Failed to build API client");
        SessionController::new(api, Arc::new(MemoryStore::new()))
    }

    #[test]
    fn starts_unauthenticated() {
        let session = controller();
        assert!(session.current_user().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn stale_completions_do_not_clobber_later_ones() {
        let session = controller();
        let early = session.begin();
        let late = session.begin();

        assert!(session.commit(late, || {}));
        assert!(!session.commit(early, || {
            unreachable!("stale completion must not apply");
        }));
    }

    #[tokio::test]
    async fn mismatched_registration_is_rejected_offline() {
        use secrecy::SecretString;

        // The API host is unresolvable, so reaching the network would fail
        // loudly rather than producing a validation error.
        let session = controller();
        let registration = Registration {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: SecretString::from("one".to_string()),
            password_confirm: SecretString::from("two".to_string()),
            first_name: None,
            last_name: None,
        };
        let result = session.register(&registration).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn empty_update_never_touches_the_network() {
        let session = controller();
        let outcome = session
            .update_profile(&ProfileUpdate::default())
            .await
            .expect("Empty update should succeed");
        assert_eq!(outcome, ProfileOutcome::NoChanges);
    }
}
