//! In-process stub of the KulturKampf backend for HTTP-level tests.
//!
//! Binds an axum router to `127.0.0.1:0` and mimics the auth and content
//! endpoints closely enough to exercise the real [`ApiClient`].

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use crate::config::ClientConfig;

pub const USERNAME: &str = "ana";
pub const PASSWORD: &str = "segredo1";

/// One request as seen by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct Inner {
    seen: Vec<Seen>,
    valid_access: HashSet<String>,
    valid_refresh: HashSet<String>,
    issued: u32,
    logout_status: Option<StatusCode>,
    user_delay: Option<Duration>,
}

/// Shared stub state; clone freely.
#[derive(Clone, Default)]
pub struct Backend {
    inner: Arc<Mutex<Inner>>,
}

impl Backend {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.lock().seen.clone()
    }

    pub fn seen_paths(&self) -> Vec<String> {
        self.lock().seen.iter().map(|s| s.path.clone()).collect()
    }

    /// Make `token` acceptable as an access token.
    pub fn grant_access(&self, token: &str) {
        self.lock().valid_access.insert(token.to_owned());
    }

    /// Make `token` acceptable as a refresh token.
    pub fn grant_refresh(&self, token: &str) {
        self.lock().valid_refresh.insert(token.to_owned());
    }

    /// Force `POST /auth/logout/` to answer with `status`.
    pub fn fail_logout_with(&self, status: StatusCode) {
        self.lock().logout_status = Some(status);
    }

    /// Delay `GET /auth/user/` responses.
    pub fn delay_user_fetch(&self, delay: Duration) {
        self.lock().user_delay = Some(delay);
    }

    fn record(&self, path: &str, headers: &HeaderMap, body: Value) -> Option<String> {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.lock().seen.push(Seen { path: path.to_owned(), authorization: authorization.clone(), body });
        authorization
    }

    fn issue_pair(&self) -> (String, String) {
        let mut inner = self.lock();
        inner.issued += 1;
        let access = format!("access-{}", inner.issued);
        let refresh = format!("refresh-{}", inner.issued);
        inner.valid_access.insert(access.clone());
        inner.valid_refresh.insert(refresh.clone());
        (access, refresh)
    }

    fn is_authorized(&self, authorization: Option<&str>) -> bool {
        authorization
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| self.lock().valid_access.contains(token))
    }
}

/// Serve `router` on an ephemeral port and return its address.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Client config pointing at a stub listening on `addr`.
pub fn config_for(addr: SocketAddr, timeout_secs: u64) -> ClientConfig {
    ClientConfig {
        api_url: format!("http://{addr}"),
        request_timeout_secs: timeout_secs,
        credentials_path: std::env::temp_dir().join("kk-unused.json"),
    }
}

/// Start the full stub backend with a 2s client timeout.
pub async fn spawn_backend() -> (Backend, ClientConfig) {
    spawn_backend_with_timeout(2).await
}

/// Start the full stub backend; the returned config uses `timeout_secs`.
pub async fn spawn_backend_with_timeout(timeout_secs: u64) -> (Backend, ClientConfig) {
    let backend = Backend::default();
    let router = Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/token/refresh/", post(refresh))
        .route("/api/auth/user/", get(current_user))
        .route("/api/auth/logout/", post(logout))
        .route("/api/perfis/", get(profiles))
        .route("/api/postagens/", get(posts))
        .route("/api/metricas/", get(metrics))
        .with_state(backend.clone());
    let addr = spawn(router).await;
    (backend, config_for(addr, timeout_secs))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Given token not valid for any token type" }))).into_response()
}

async fn login(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("/auth/login/", &headers, body.clone());
    if body["username"] != USERNAME || body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "No active account found with the given credentials" })),
        )
            .into_response();
    }
    let (access, refresh) = b.issue_pair();
    Json(json!({ "access": access, "refresh": refresh })).into_response()
}

async fn register(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("/auth/register/", &headers, body.clone());
    if body["username"] == USERNAME {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Nome de usuário já existe" }))).into_response();
    }
    let (access, refresh) = b.issue_pair();
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "Usuário criado com sucesso",
            "user": { "id": 2, "username": body["username"], "email": body["email"] },
            "tokens": { "access": access, "refresh": refresh }
        })),
    )
        .into_response()
}

async fn refresh(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("/auth/token/refresh/", &headers, body.clone());
    let presented = body["refresh"].as_str().unwrap_or_default().to_owned();
    if !b.lock().valid_refresh.contains(&presented) {
        return unauthorized();
    }
    let (access, _) = b.issue_pair();
    Json(json!({ "access": access })).into_response()
}

async fn current_user(State(b): State<Backend>, headers: HeaderMap) -> Response {
    let authorization = b.record("/auth/user/", &headers, Value::Null);
    let delay = b.lock().user_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if !b.is_authorized(authorization.as_deref()) {
        return unauthorized();
    }
    Json(json!({ "id": 1, "username": USERNAME, "email": "ana@example.com", "is_staff": false })).into_response()
}

async fn logout(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("/auth/logout/", &headers, body);
    let forced = b.lock().logout_status;
    match forced {
        Some(status) => (status, Json(json!({ "error": "Token inválido ou expirado" }))).into_response(),
        None => Json(json!({ "message": "Logout realizado com sucesso" })).into_response(),
    }
}

async fn profiles(State(b): State<Backend>, headers: HeaderMap) -> Response {
    let authorization = b.record("/perfis/", &headers, Value::Null);
    if !b.is_authorized(authorization.as_deref()) {
        return unauthorized();
    }
    Json(json!([
        { "id": 1, "nick": "ana", "topicos_lista": ["política"], "total_posts": 2 },
        { "id": 2, "nick": "bia", "bio": "ensaísta" }
    ]))
    .into_response()
}

async fn posts(State(b): State<Backend>, headers: HeaderMap) -> Response {
    let authorization = b.record("/postagens/", &headers, Value::Null);
    if !b.is_authorized(authorization.as_deref()) {
        return unauthorized();
    }
    Json(json!({
        "count": 25,
        "next": null,
        "previous": null,
        "results": [
            { "id": 10, "title": "Sobre a crise", "platform": "substack", "profile_nick": "ana",
              "publish_date": "2024-03-05T14:30:00Z" }
        ]
    }))
    .into_response()
}

async fn metrics(State(b): State<Backend>, headers: HeaderMap) -> Response {
    let authorization = b.record("/metricas/", &headers, Value::Null);
    if !b.is_authorized(authorization.as_deref()) {
        return unauthorized();
    }
    Json(json!([
        { "profile_nick": "ana", "month": "2024-02", "month_posts": 3, "days_frequency": 9.5 },
        { "profile_nick": "bia", "month": "2024-01", "month_posts": 1 },
        { "profile_nick": "bia", "month": "2024-02", "month_posts": 2 }
    ]))
    .into_response()
}
