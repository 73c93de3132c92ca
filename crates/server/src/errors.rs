use axum::http::header::{ALLOW, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cafe_trivia_core::domain::DomainError;
use cafe_trivia_core::ports::store::StoreError;
use serde::Serialize;

/// Every failure leaves the server as `{success:false, error, message}`.
#[derive(Debug)]
pub struct ServerError {
    status: StatusCode,
    code: Option<String>,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ServerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Error with the stock message for `status`.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, default_message(status))
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::from_status(StatusCode::NOT_FOUND)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            success: false,
            error: self.status.as_u16(),
            message: self.message,
            code: self.code,
        };
        (self.status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ServerError {
    fn from(err: DomainError) -> Self {
        tracing::debug!(error = %err, "request rejected by validation");
        if err.is_malformed() {
            ServerError::bad_request(err.to_string())
        } else {
            ServerError::unprocessable(err.to_string())
        }
    }
}

/// Store failure during a write: the request could not be processed.
pub fn map_store_error(err: StoreError, message: &str) -> ServerError {
    match err {
        StoreError::Conflict(detail) => {
            tracing::debug!(detail = %detail, "{message}");
            ServerError::unprocessable(format!("{message}: {detail}"))
        }
        other => {
            tracing::error!(error = %other, "{message}");
            ServerError::from_status(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}

/// Store failure during a read.
pub fn internal(err: StoreError, message: &str) -> ServerError {
    tracing::error!(error = %err, "{message}");
    ServerError::from_status(StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn not_found_fallback() -> ServerError {
    ServerError::not_found()
}

/// The router answers a wrong verb with an empty 405; give it an envelope.
pub async fn envelope_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.headers().contains_key(CONTENT_TYPE)
    {
        return response;
    }
    let allow = response.headers().get(ALLOW).cloned();
    let mut rewritten = ServerError::from_status(StatusCode::METHOD_NOT_ALLOWED).into_response();
    if let Some(allow) = allow {
        rewritten.headers_mut().insert(ALLOW, allow);
    }
    rewritten
}

fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "resource not found",
        StatusCode::METHOD_NOT_ALLOWED => "method not allowed",
        StatusCode::UNPROCESSABLE_ENTITY => "unprocessable",
        StatusCode::INTERNAL_SERVER_ERROR => "internal server error",
        _ => status.canonical_reason().unwrap_or("error"),
    }
}
