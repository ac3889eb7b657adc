//! Session manager: acquires, persists, attaches, refreshes and clears credentials.
//!
//! ARCHITECTURE
//! ============
//! The manager owns the published [`SessionSnapshot`] (a `watch` channel that
//! views subscribe to) and drives the remote [`AuthApi`] and the persistent
//! [`CredentialStore`]. Phases: `Bootstrapping` → `Anonymous` /
//! `Authenticated`, cycling between the latter two for the manager's life.
//!
//! Bootstrap runs once. Every other public operation first awaits it, so no
//! login, refresh or logout can interleave with the startup check, and
//! `loading` turns false exactly once. Credential-mutating operations,
//! `logout` included, are then serialized by an async in-flight lock, so a
//! logout always lands after any login or refresh already running.
//!
//! ERROR HANDLING
//! ==============
//! Nothing escapes as an error except form-facing [`AuthFailure`]s from
//! `login`/`register`. Bootstrap and refresh failures become transitions to
//! `Anonymous`; a failed logout notification is only logged.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};

use super::recovery::{Attempt, BOOTSTRAP_CHAIN, Recovery, warrants_refresh};
use super::state::{SessionPhase, SessionSnapshot};
use crate::forms::{self, FormError};
use crate::net::auth::AuthApi;
use crate::net::error::ApiError;
use crate::net::types::{LoginRequest, RegisterRequest, TokenPair, User};
use crate::store::{CredentialKey, CredentialStore, StoreError};

pub const LOGIN_FALLBACK: &str = "Erro ao fazer login";
pub const REGISTER_FALLBACK: &str = "Erro ao criar conta";

/// Failed `login`/`register`, carrying the message forms show inline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub message: String,
}

impl From<FormError> for AuthFailure {
    fn from(e: FormError) -> Self {
        Self { message: e.to_string() }
    }
}

/// Internal failure of a multi-step credential operation.
#[derive(Debug, thiserror::Error)]
enum StepError {
    #[error("no refresh token stored")]
    MissingRefreshToken,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StepError {
    fn into_failure(self, fallback: &str) -> AuthFailure {
        let message = match &self {
            Self::Api(e) => e.user_message_or(fallback),
            Self::MissingRefreshToken | Self::Store(_) => fallback.to_owned(),
        };
        AuthFailure { message }
    }
}

pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionSnapshot>,
    in_flight: Mutex<()>,
    bootstrap_started: AtomicBool,
}

impl SessionManager {
    /// Create a manager in `Bootstrapping`. Nothing runs until [`Self::bootstrap`]
    /// (or any other operation) is awaited.
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::bootstrapping());
        Self { api, store, state, in_flight: Mutex::new(()), bootstrap_started: AtomicBool::new(false) }
    }

    /// Create a manager and kick off its bootstrap on the current runtime.
    #[must_use]
    pub fn start(api: Arc<dyn AuthApi>, store: Arc<dyn CredentialStore>) -> Arc<Self> {
        let manager = Arc::new(Self::new(api, store));
        let task = Arc::clone(&manager);
        tokio::spawn(async move {
            task.bootstrap().await;
        });
        manager
    }

    // =========================================================================
    // OBSERVERS
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Receiver notified on every published state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Resolve once bootstrap has finished (`loading == false`).
    pub async fn ready(&self) -> SessionSnapshot {
        let mut rx = self.state.subscribe();
        let settled = rx.wait_for(|s| !s.loading).await.map(|s| s.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Rebuild the session from persisted credentials.
    ///
    /// Runs the recovery chain only on the first call; later calls wait for
    /// that run to finish and report its outcome. If the running future is
    /// dropped before it settles, the next `bootstrap()` call runs the chain
    /// again; callers already parked in [`Self::ready`] wait for that rerun.
    pub async fn bootstrap(&self) -> SessionPhase {
        if self.bootstrap_started.swap(true, Ordering::SeqCst) {
            return self.ready().await.phase;
        }

        let mut run = BootstrapRun { started: &self.bootstrap_started, settled: false };
        let _guard = self.in_flight.lock().await;
        let user = self.run_bootstrap_chain().await;
        self.publish(user);
        run.settled = true;

        let phase = self.phase();
        tracing::info!(?phase, "session bootstrap finished");
        phase
    }

    /// Exchange username/password for tokens and load the user.
    ///
    /// # Errors
    ///
    /// [`AuthFailure`] with a user-facing message; nothing is stored on failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthFailure> {
        forms::validate_login(username, password)?;
        self.bootstrap().await;
        let _guard = self.in_flight.lock().await;

        match self.try_login(username, password).await {
            Ok(user) => {
                tracing::info!(username = %user.username, "login succeeded");
                self.publish(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                Err(e.into_failure(LOGIN_FALLBACK))
            }
        }
    }

    /// Validate the form, create the account, and sign in as the new user.
    ///
    /// A form rejected locally never reaches the network.
    ///
    /// # Errors
    ///
    /// [`AuthFailure`] with a user-facing message; nothing is stored on failure.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        password2: &str,
    ) -> Result<User, AuthFailure> {
        forms::validate_registration(username, email, password, password2)?;
        self.bootstrap().await;
        let _guard = self.in_flight.lock().await;

        let request = RegisterRequest { username, email, password, password2 };
        match self.try_register(&request).await {
            Ok(user) => {
                tracing::info!(username = %user.username, "registration succeeded");
                self.publish(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                Err(e.into_failure(REGISTER_FALLBACK))
            }
        }
    }

    /// Trade the stored refresh token for a new access token and reload the user.
    ///
    /// Returns `false` (with the session cleared) on any failure.
    pub async fn refresh_and_refetch(&self) -> bool {
        self.bootstrap().await;
        let _guard = self.in_flight.lock().await;

        let user = self.refresh_inner().await;
        let refreshed = user.is_some();
        self.publish(user);
        refreshed
    }

    /// Best-effort server logout, then unconditionally clear the session.
    pub async fn logout(&self) {
        self.bootstrap().await;
        let _guard = self.in_flight.lock().await;

        if let Some(refresh) = self.read(CredentialKey::RefreshToken) {
            if let Err(e) = self.api.logout(&refresh).await {
                tracing::warn!(error = %e, "logout notification failed");
            }
        }
        self.clear_credentials();
        self.publish(None);
        tracing::info!("session cleared");
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn run_bootstrap_chain(&self) -> Option<User> {
        for step in BOOTSTRAP_CHAIN {
            match self.attempt(step).await {
                Attempt::Resolved(user) => return Some(user),
                Attempt::Fallthrough => {}
                Attempt::Halt => return None,
            }
        }
        self.clear_credentials();
        None
    }

    async fn attempt(&self, step: Recovery) -> Attempt {
        match step {
            Recovery::StoredAccessToken => {
                let Some(access) = self.read(CredentialKey::AccessToken) else {
                    return Attempt::Halt;
                };
                if let Err(e) = self.api.attach_bearer(&access) {
                    tracing::warn!(error = %e, "stored access token unusable");
                    return Attempt::Fallthrough;
                }
                match self.api.current_user().await {
                    Ok(user) => Attempt::Resolved(user),
                    Err(e) if warrants_refresh(&e) => {
                        tracing::info!("stored access token rejected; refreshing");
                        Attempt::Fallthrough
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to load user; keeping stored credentials");
                        self.api.detach_bearer();
                        Attempt::Halt
                    }
                }
            }
            Recovery::RefreshAndRefetch => match self.refresh_inner().await {
                Some(user) => Attempt::Resolved(user),
                None => Attempt::Fallthrough,
            },
        }
    }

    /// Refresh without locking or publishing; clears credentials on failure.
    async fn refresh_inner(&self) -> Option<User> {
        match self.try_refresh().await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed; clearing session");
                self.clear_credentials();
                None
            }
        }
    }

    async fn try_refresh(&self) -> Result<User, StepError> {
        let refresh = self
            .read(CredentialKey::RefreshToken)
            .ok_or(StepError::MissingRefreshToken)?;
        let access = self.api.refresh(&refresh).await?;
        self.store.set(CredentialKey::AccessToken, &access)?;
        self.api.attach_bearer(&access)?;
        Ok(self.api.current_user().await?)
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<User, StepError> {
        let tokens = self.api.login(&LoginRequest { username, password }).await?;

        let loaded = async {
            self.persist(&tokens)?;
            Ok::<_, StepError>(self.api.current_user().await?)
        }
        .await;
        if loaded.is_err() {
            self.roll_back();
        }
        loaded
    }

    async fn try_register(&self, request: &RegisterRequest<'_>) -> Result<User, StepError> {
        let response = self.api.register(request).await?;
        if let Err(e) = self.persist(&response.tokens) {
            self.roll_back();
            return Err(e);
        }
        Ok(response.user)
    }

    /// Store both tokens and attach the access token.
    fn persist(&self, tokens: &TokenPair) -> Result<(), StepError> {
        self.store.set(CredentialKey::AccessToken, &tokens.access)?;
        self.store.set(CredentialKey::RefreshToken, &tokens.refresh)?;
        self.api.attach_bearer(&tokens.access)?;
        Ok(())
    }

    /// Undo a half-finished sign-in. Earlier tokens were already overwritten,
    /// so any previous session ends too.
    fn roll_back(&self) {
        self.clear_credentials();
        self.publish(None);
    }

    fn clear_credentials(&self) {
        for key in [CredentialKey::AccessToken, CredentialKey::RefreshToken] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(error = %e, key = key.as_str(), "failed to clear credential");
            }
        }
        self.api.detach_bearer();
    }

    /// Read a slot, treating store failures and empty strings as absent.
    fn read(&self, key: CredentialKey) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, key = key.as_str(), "failed to read credential");
                None
            }
        }
    }

    fn publish(&self, user: Option<User>) {
        self.state.send_replace(SessionSnapshot::settled(user));
    }
}

/// Re-arms bootstrap when a run is dropped before it publishes.
struct BootstrapRun<'a> {
    started: &'a AtomicBool,
    settled: bool,
}

impl Drop for BootstrapRun<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.started.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;

#[cfg(test)]
#[path = "manager_http_test.rs"]
mod http_tests;
