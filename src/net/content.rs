//! Read-only content collections: profiles, posts, metrics.
//!
//! Each list endpoint may answer with a bare array or a paginated
//! `{count, results}` envelope; both decode through [`Page`].

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::http::ApiClient;
use super::types::{Metric, Page, Post, Profile};

pub const PROFILES_PATH: &str = "/perfis/";
pub const POSTS_PATH: &str = "/postagens/";
pub const METRICS_PATH: &str = "/metricas/";

/// Collection sizes shown on the home dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub profiles: u64,
    pub posts: u64,
    pub metrics: u64,
}

/// Content fetches over the shared [`ApiClient`], so they carry whatever
/// bearer token the session has attached.
#[derive(Clone)]
pub struct ContentApi {
    client: Arc<ApiClient>,
}

impl ContentApi {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from `GET /perfis/`.
    pub async fn profiles(&self) -> Result<Vec<Profile>, ApiError> {
        self.list(PROFILES_PATH).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from `GET /postagens/`.
    pub async fn posts(&self) -> Result<Vec<Post>, ApiError> {
        self.list(POSTS_PATH).await
    }

    /// # Errors
    ///
    /// Any [`ApiError`] from `GET /metricas/`.
    pub async fn metrics(&self) -> Result<Vec<Metric>, ApiError> {
        self.list(METRICS_PATH).await
    }

    /// Fetch all three collections concurrently and report their sizes.
    ///
    /// # Errors
    ///
    /// The first [`ApiError`] among the three requests.
    pub async fn stats(&self) -> Result<HubStats, ApiError> {
        let (profiles, posts, metrics) = tokio::try_join!(
            self.client.get_json::<Page<serde_json::Value>>(PROFILES_PATH),
            self.client.get_json::<Page<serde_json::Value>>(POSTS_PATH),
            self.client.get_json::<Page<serde_json::Value>>(METRICS_PATH),
        )?;
        Ok(HubStats { profiles: profiles.total(), posts: posts.total(), metrics: metrics.total() })
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let page: Page<T> = self.client.get_json(path).await?;
        Ok(page.into_items())
    }
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
