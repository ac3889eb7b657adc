//! Scripted [`AuthApi`] double for session tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::net::auth::AuthApi;
use crate::net::error::ApiError;
use crate::net::types::{LoginRequest, RegisterRequest, RegisterResponse, TokenPair, User};
use crate::session::SessionManager;
use crate::store::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    Refresh,
    CurrentUser,
    Logout,
}

/// One call as seen by the mock, with the bearer attached at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub endpoint: Endpoint,
    pub bearer: Option<String>,
    pub arg: Option<String>,
}

#[derive(Default)]
struct Script {
    login: VecDeque<Result<TokenPair, ApiError>>,
    register: VecDeque<Result<RegisterResponse, ApiError>>,
    refresh: VecDeque<Result<String, ApiError>>,
    user: VecDeque<Result<User, ApiError>>,
    logout: VecDeque<Result<(), ApiError>>,
    bearer: Option<String>,
    calls: Vec<Call>,
    stall_user: bool,
}

/// Mock backend answering from per-endpoint queues.
///
/// An endpoint with an empty queue answers with a transport error.
#[derive(Default)]
pub struct MockAuth {
    script: Mutex<Script>,
}

fn unscripted<T>() -> Result<T, ApiError> {
    Err(ApiError::Transport("unscripted call".into()))
}

impl MockAuth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn on_login(&self, result: Result<TokenPair, ApiError>) -> &Self {
        self.lock().login.push_back(result);
        self
    }

    pub fn on_register(&self, result: Result<RegisterResponse, ApiError>) -> &Self {
        self.lock().register.push_back(result);
        self
    }

    pub fn on_refresh(&self, result: Result<String, ApiError>) -> &Self {
        self.lock().refresh.push_back(result);
        self
    }

    pub fn on_user(&self, result: Result<User, ApiError>) -> &Self {
        self.lock().user.push_back(result);
        self
    }

    pub fn on_logout(&self, result: Result<(), ApiError>) -> &Self {
        self.lock().logout.push_back(result);
        self
    }

    /// Make the next user fetch never complete.
    pub fn stall_next_user(&self) -> &Self {
        self.lock().stall_user = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.lock().calls.iter().map(|c| c.endpoint).collect()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.lock().calls.iter().filter(|c| c.endpoint == endpoint).count()
    }

    pub fn current_bearer(&self) -> Option<String> {
        self.lock().bearer.clone()
    }

    fn record(&self, endpoint: Endpoint, arg: Option<&str>) -> Option<String> {
        let mut script = self.lock();
        let bearer = script.bearer.clone();
        script.calls.push(Call { endpoint, bearer: bearer.clone(), arg: arg.map(str::to_owned) });
        bearer
    }
}

#[async_trait::async_trait]
impl AuthApi for MockAuth {
    async fn login(&self, request: &LoginRequest<'_>) -> Result<TokenPair, ApiError> {
        self.record(Endpoint::Login, Some(request.username));
        tokio::task::yield_now().await;
        self.lock().login.pop_front().unwrap_or_else(unscripted)
    }

    async fn register(&self, request: &RegisterRequest<'_>) -> Result<RegisterResponse, ApiError> {
        self.record(Endpoint::Register, Some(request.username));
        tokio::task::yield_now().await;
        self.lock().register.pop_front().unwrap_or_else(unscripted)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        self.record(Endpoint::Refresh, Some(refresh_token));
        tokio::task::yield_now().await;
        self.lock().refresh.pop_front().unwrap_or_else(unscripted)
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.record(Endpoint::CurrentUser, None);
        let stall = std::mem::take(&mut self.lock().stall_user);
        if stall {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;
        self.lock().user.pop_front().unwrap_or_else(unscripted)
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        self.record(Endpoint::Logout, Some(refresh_token));
        tokio::task::yield_now().await;
        self.lock().logout.pop_front().unwrap_or_else(unscripted)
    }

    fn attach_bearer(&self, access_token: &str) -> Result<(), ApiError> {
        if access_token.contains('\n') {
            return Err(ApiError::InvalidHeader("newline in token".into()));
        }
        self.lock().bearer = Some(access_token.to_owned());
        Ok(())
    }

    fn detach_bearer(&self) {
        self.lock().bearer = None;
    }
}

pub fn user(username: &str) -> User {
    User { username: username.to_owned(), ..User::default() }
}

pub fn pair(access: &str, refresh: &str) -> TokenPair {
    TokenPair { access: access.to_owned(), refresh: refresh.to_owned() }
}

pub fn status(code: u16) -> ApiError {
    ApiError::Status { status: code, body: String::new() }
}

pub fn status_with_detail(code: u16, detail: &str) -> ApiError {
    ApiError::Status { status: code, body: serde_json::json!({ "detail": detail }).to_string() }
}

pub fn manager(api: &Arc<MockAuth>, store: &Arc<MemoryStore>) -> SessionManager {
    SessionManager::new(api.clone(), store.clone())
}
