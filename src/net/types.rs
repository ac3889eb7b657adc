//! Wire types shared by the auth and content endpoints.
//!
//! Content records mirror the backend serializers. Every field defaults when
//! absent so one incomplete record never fails a whole list.

use serde::{Deserialize, Serialize};

// =============================================================================
// AUTH
// =============================================================================

/// Authenticated user as returned by `GET /auth/user/`.
///
/// Only `username` is read by the client; everything else is carried through
/// untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// Look up a pass-through field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password2: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub tokens: TokenPair,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LogoutRequest<'a> {
    pub refresh_token: &'a str,
}

// =============================================================================
// CONTENT
// =============================================================================

/// Collection body: either a bare array or a paginated envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        results: Vec<T>,
    },
    List(Vec<T>),
}

impl<T> Page<T> {
    /// Total reported by the server, else the number of items received.
    #[must_use]
    pub fn total(&self) -> u64 {
        match self {
            Self::Paginated { count: Some(count), .. } => *count,
            Self::Paginated { count: None, results } => results.len() as u64,
            Self::List(items) => items.len() as u64,
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paginated { results, .. } => results,
            Self::List(items) => items,
        }
    }
}

/// An author's writing profile (`/perfis/`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    pub id: i64,
    pub nick: String,
    pub valete_profile: Option<String>,
    pub valete_link: Option<String>,
    pub substack_profile: Option<String>,
    pub substack_url: Option<String>,
    pub topics: String,
    pub topicos_lista: Vec<String>,
    pub bio: String,
    pub total_posts: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Publishing platform of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Valete,
    Substack,
    #[default]
    #[serde(other)]
    Other,
}

impl Platform {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Valete => "Valete",
            Self::Substack => "Substack",
            Self::Other => "Outra",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Coauthor {
    pub id: i64,
    pub nick: String,
}

/// A published article (`/postagens/`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Post {
    pub id: i64,
    pub profile: i64,
    pub profile_nick: String,
    pub title: String,
    pub topic: String,
    pub publish_date: String,
    pub url: String,
    pub platform: Platform,
    pub coauthors: Vec<i64>,
    pub coauthors_details: Vec<Coauthor>,
    pub content_preview: String,
    pub created_at: Option<String>,
}

/// Monthly production statistics for one author (`/metricas/`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Metric {
    pub id: i64,
    pub profile: i64,
    pub profile_nick: String,
    /// Reference month, `YYYY-MM`.
    pub month: String,
    pub month_posts: i64,
    pub days_frequency: Option<f64>,
    pub week_posts: f64,
    pub total_posts: i64,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
