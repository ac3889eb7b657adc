//! Auth endpoints consumed by the session manager.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session manager talks to the backend only through [`AuthApi`], which
//! also covers the bearer header because the header map belongs to the HTTP
//! client. [`ApiClient`] is the production implementation; tests script a
//! mock.

use super::error::ApiError;
use super::http::ApiClient;
use super::types::{
    LoginRequest, LogoutRequest, RefreshRequest, RefreshResponse, RegisterRequest, RegisterResponse, TokenPair, User,
};

pub const LOGIN_PATH: &str = "/auth/login/";
pub const REGISTER_PATH: &str = "/auth/register/";
pub const REFRESH_PATH: &str = "/auth/token/refresh/";
pub const CURRENT_USER_PATH: &str = "/auth/user/";
pub const LOGOUT_PATH: &str = "/auth/logout/";

/// Remote auth operations plus control over the outgoing bearer header.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange username/password for a token pair.
    async fn login(&self, request: &LoginRequest<'_>) -> Result<TokenPair, ApiError>;

    /// Create an account; the response carries tokens and the new user.
    async fn register(&self, request: &RegisterRequest<'_>) -> Result<RegisterResponse, ApiError>;

    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError>;

    /// Fetch the user the attached bearer token belongs to.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Ask the server to revoke `refresh_token`.
    async fn logout(&self, refresh_token: &str) -> Result<(), ApiError>;

    /// Attach `access_token` to every later request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidHeader`] if the token is not header-safe.
    fn attach_bearer(&self, access_token: &str) -> Result<(), ApiError>;

    /// Remove the bearer header.
    fn detach_bearer(&self);
}

#[async_trait::async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, request: &LoginRequest<'_>) -> Result<TokenPair, ApiError> {
        self.post_json(LOGIN_PATH, request).await
    }

    async fn register(&self, request: &RegisterRequest<'_>) -> Result<RegisterResponse, ApiError> {
        self.post_json(REGISTER_PATH, request).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let response: RefreshResponse = self
            .post_json(REFRESH_PATH, &RefreshRequest { refresh: refresh_token })
            .await?;
        Ok(response.access)
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json(CURRENT_USER_PATH).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        self.post_empty(LOGOUT_PATH, &LogoutRequest { refresh_token }).await
    }

    fn attach_bearer(&self, access_token: &str) -> Result<(), ApiError> {
        ApiClient::attach_bearer(self, access_token)
    }

    fn detach_bearer(&self) {
        ApiClient::detach_bearer(self);
    }
}
