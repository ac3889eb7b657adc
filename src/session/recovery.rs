//! Ordered fallback chain used to rebuild a session at startup.
//!
//! DESIGN
//! ======
//! Bootstrap walks [`BOOTSTRAP_CHAIN`] front to back: first the stored
//! access token, then one refresh-and-refetch. The chain is data, so the
//! single retry bound is visible here rather than buried in nested handlers.
//!
//! TRADE-OFFS
//! ==========
//! Only a 401 on the user fetch moves on to the refresh step. Timeouts,
//! unreachable servers and 5xx answers say nothing about the token, so they
//! halt the chain with credentials kept for the next start instead of
//! spending (and possibly burning) the refresh token.

use crate::net::error::ApiError;
use crate::net::types::User;

/// One strategy in the bootstrap chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Present the persisted access token and fetch the user.
    StoredAccessToken,
    /// Trade the persisted refresh token for a new access token, then fetch the user.
    RefreshAndRefetch,
}

pub const BOOTSTRAP_CHAIN: [Recovery; 2] = [Recovery::StoredAccessToken, Recovery::RefreshAndRefetch];

/// Result of running one [`Recovery`] step.
#[derive(Debug)]
pub enum Attempt {
    /// Session rebuilt for this user.
    Resolved(User),
    /// This step cannot help; try the next one.
    Fallthrough,
    /// Stop the chain and settle as anonymous, keeping stored credentials.
    Halt,
}

/// Whether a failed user fetch with the stored access token justifies a refresh.
#[must_use]
pub fn warrants_refresh(error: &ApiError) -> bool {
    error.is_auth_rejection()
}

#[cfg(test)]
#[path = "recovery_test.rs"]
mod tests;
