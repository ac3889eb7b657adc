//! Shared HTTP client for the KulturKampf REST API.
//!
//! DESIGN
//! ======
//! One `reqwest::Client` per process, built with the configured per-call
//! timeout. The default header map (content type plus the bearer token once a
//! session exists) lives on the client instance and is only changed through
//! [`ApiClient::attach_bearer`] / [`ApiClient::detach_bearer`]. Each request
//! takes a snapshot of the map, so a header change never tears a request that
//! is already in flight.

use std::sync::RwLock;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::config::ClientConfig;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    default_headers: RwLock<HeaderMap>,
}

impl ApiClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self { http, base_url: config.api_base(), default_headers: RwLock::new(headers) })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Present `token` as `Authorization: Bearer <token>` on every later request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidHeader`] if the token contains bytes that are
    /// not legal in a header value.
    pub fn attach_bearer(&self, token: &str) -> Result<(), ApiError> {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
        value.set_sensitive(true);
        self.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Stop presenting a bearer token. No-op when none is attached.
    pub fn detach_bearer(&self) {
        self.headers_mut().remove(AUTHORIZATION);
    }

    /// Token currently attached to the default headers, if any.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        let headers = self
            .default_headers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned)
    }

    /// `GET <base>/<path>` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures as [`ApiError`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.send(self.http.get(self.url(path))).await?;
        decode(&text)
    }

    /// `POST <base>/<path>` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Transport, status, and decode failures as [`ApiError`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.send(self.http.post(self.url(path)).json(body)).await?;
        decode(&text)
    }

    /// `POST <base>/<path>` with a JSON body, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Transport and status failures as [`ApiError`].
    pub async fn post_empty<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn headers_mut(&self) -> std::sync::RwLockWriteGuard<'_, HeaderMap> {
        self.default_headers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let headers = self
            .default_headers
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        let response = request
            .headers(headers)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::debug!(status, "api request rejected");
            return Err(ApiError::Status { status, body: text });
        }
        Ok(text)
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
