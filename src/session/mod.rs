//! Auth session: state, bootstrap recovery chain and the manager that drives them.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`manager::SessionManager`] is created at startup and shared (behind an
//! `Arc`) by the route guard, the forms and every user-aware view. Those read
//! the published [`state::SessionSnapshot`]; only the manager writes it.

pub mod manager;
pub mod recovery;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use manager::{AuthFailure, SessionManager};
pub use state::{SessionPhase, SessionSnapshot};
