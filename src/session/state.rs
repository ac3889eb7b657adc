//! Observable auth-session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Published by the session manager over a `watch` channel and read by the
//! route guard and user-aware views to coordinate login redirects and
//! identity-dependent output.

use crate::net::types::User;

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Initial check of persisted credentials still running.
    #[default]
    Bootstrapping,
    Anonymous,
    Authenticated,
}

/// Current user and loading status.
///
/// `user.is_some()` exactly when `phase` is `Authenticated`, and `loading`
/// exactly when `phase` is `Bootstrapping`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub user: Option<User>,
    pub loading: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn bootstrapping() -> Self {
        Self { phase: SessionPhase::Bootstrapping, user: None, loading: true }
    }

    /// Settled state for `user`: `Authenticated` when present, else `Anonymous`.
    #[must_use]
    pub fn settled(user: Option<User>) -> Self {
        let phase = if user.is_some() { SessionPhase::Authenticated } else { SessionPhase::Anonymous };
        Self { phase, user, loading: false }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::bootstrapping()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
