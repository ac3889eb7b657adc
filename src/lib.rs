//! KulturKampf client: auth session lifecycle plus the content views built on it.
//!
//! ARCHITECTURE
//! ============
//! - `config`: environment-driven client settings.
//! - `net`: HTTP client, error taxonomy, auth and content endpoints.
//! - `store`: persisted access/refresh tokens.
//! - `session`: the session manager and its observable state.
//! - `guard`: gating of protected routes on session state.
//! - `forms`: login/registration validation.
//! - `report`: chart series and Portuguese labels for display.

pub mod config;
pub mod forms;
pub mod guard;
pub mod net;
pub mod report;
pub mod session;
pub mod store;
