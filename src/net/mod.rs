//! Network layer: HTTP client, error taxonomy, wire types, endpoints.
//!
//! DESIGN
//! ======
//! `http` owns transport concerns (timeout, default headers, status
//! classification). `auth` and `content` are thin endpoint wrappers on top,
//! and `auth` is the trait seam the session manager is tested through.

pub mod auth;
pub mod content;
pub mod error;
pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;
