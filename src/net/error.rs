//! API error taxonomy and user-facing messages.
//!
//! ERROR HANDLING
//! ==============
//! Every failed request ends up as an [`ApiError`]. Transport failures (no
//! response at all, timeouts included) and HTTP status failures have a fixed
//! Portuguese message that forms display inline. Decode and header failures
//! have none; callers pick an operation-specific fallback.

pub const MSG_UNREACHABLE: &str = "Não foi possível conectar ao servidor. Verifique sua conexão.";
pub const MSG_BAD_REQUEST: &str = "Dados inválidos. Verifique as informações enviadas.";
pub const MSG_UNAUTHORIZED: &str = "Credenciais inválidas ou sessão expirada.";
pub const MSG_FORBIDDEN: &str = "Você não tem permissão para acessar este recurso.";
pub const MSG_NOT_FOUND: &str = "Recurso não encontrado.";
pub const MSG_SERVER_ERROR: &str = "Erro interno do servidor. Tente novamente mais tarde.";
pub const MSG_UNAVAILABLE: &str = "Serviço temporariamente indisponível. Tente novamente em alguns instantes.";
pub const MSG_UNEXPECTED: &str = "Ocorreu um erro inesperado.";

/// Errors produced by API client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (offline, refused, timed out).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned status {status}")]
    Status { status: u16, body: String },

    /// The success body could not be deserialized.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A token could not be encoded as a header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// HTTP status code, when the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the server rejected the presented credentials.
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        self.status() == Some(401)
    }

    /// Classified message for transport and HTTP failures.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Transport(_) => Some(MSG_UNREACHABLE.to_owned()),
            Self::Status { status, body } => Some(status_message(*status, body)),
            Self::Decode(_) | Self::InvalidHeader(_) | Self::HttpClientBuild(_) => None,
        }
    }

    /// [`Self::user_message`] or `fallback` when the error is unclassified.
    #[must_use]
    pub fn user_message_or(&self, fallback: &str) -> String {
        self.user_message().unwrap_or_else(|| fallback.to_owned())
    }
}

fn status_message(status: u16, body: &str) -> String {
    match status {
        400 => server_detail(body).unwrap_or_else(|| MSG_BAD_REQUEST.to_owned()),
        401 => MSG_UNAUTHORIZED.to_owned(),
        403 => MSG_FORBIDDEN.to_owned(),
        404 => MSG_NOT_FOUND.to_owned(),
        500 => MSG_SERVER_ERROR.to_owned(),
        503 => MSG_UNAVAILABLE.to_owned(),
        _ => server_detail(body).unwrap_or_else(|| MSG_UNEXPECTED.to_owned()),
    }
}

/// String `detail` or `error` field of a JSON error body.
fn server_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "error"]
        .iter()
        .filter_map(|key| json.get(key).and_then(serde_json::Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
