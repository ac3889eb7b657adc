//! Route guard for protected views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every view applies the same rule: nothing is decided while the session is
//! still bootstrapping, and an anonymous visitor on a protected route is sent
//! to `/login`.

use crate::session::{SessionManager, SessionSnapshot};

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    Profiles,
    Posts,
    Metrics,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Register => "/cadastro",
            Self::Home => "/",
            Self::Profiles => "/perfis",
            Self::Posts => "/postagens",
            Self::Metrics => "/metricas",
        }
    }

    #[must_use]
    pub fn is_protected(self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }
}

/// What a view should do with the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Bootstrap still running; render a placeholder.
    Wait,
    Redirect(&'static str),
    Allow,
}

/// `true` once bootstrap has settled without a user.
#[must_use]
pub fn should_redirect_unauth(state: &SessionSnapshot) -> bool {
    !state.loading && state.user.is_none()
}

#[must_use]
pub fn decide(route: Route, state: &SessionSnapshot) -> GuardDecision {
    if state.loading {
        return GuardDecision::Wait;
    }
    if route.is_protected() && should_redirect_unauth(state) {
        return GuardDecision::Redirect(LOGIN_PATH);
    }
    GuardDecision::Allow
}

/// Wait for bootstrap, then decide. Never returns [`GuardDecision::Wait`].
pub async fn resolve(session: &SessionManager, route: Route) -> GuardDecision {
    let state = session.ready().await;
    let decision = decide(route, &state);
    if let GuardDecision::Redirect(to) = decision {
        tracing::debug!(from = route.path(), to, "redirecting anonymous visitor");
    }
    decision
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
