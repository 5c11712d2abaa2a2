use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// An HTTP failure raised by the auth decorators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn kind(&self) -> String {
        self.status
            .canonical_reason()
            .unwrap_or("ERROR")
            .to_ascii_uppercase()
            .replace(' ', "_")
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.message,
        });
        (self.status, axum::Json(body)).into_response()
    }
}

/// Builds the [`HttpError`] values the decorators return.
pub trait HttpErrorFactory: Send + Sync {
    fn http_error(&self, status: StatusCode, message: &str) -> HttpError;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHttpErrorFactory;

impl HttpErrorFactory for DefaultHttpErrorFactory {
    fn http_error(&self, status: StatusCode, message: &str) -> HttpError {
        HttpError {
            status,
            message: message.to_owned(),
        }
    }
}

/// Webservice error variants.
#[derive(Debug, thiserror::Error)]
pub enum WebservicesError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("event listener not found")]
    EventListenerNotFound,
    #[error("invalid notifier type {0:?}")]
    InvalidNotifierType(String),
    #[error("invalid event type {0:?}")]
    InvalidEventType(String),
    #[error("at least one event type is required")]
    MissingEventTypes,
    #[error("notifier config must be a JSON object")]
    InvalidNotifierConfig,
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl WebservicesError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "HTTP",
            Self::EventListenerNotFound => "EVENT_LISTENER_NOT_FOUND",
            Self::InvalidNotifierType(_) => "INVALID_NOTIFIER_TYPE",
            Self::InvalidEventType(_) => "INVALID_EVENT_TYPE",
            Self::MissingEventTypes => "MISSING_EVENT_TYPES",
            Self::InvalidNotifierConfig => "INVALID_NOTIFIER_CONFIG",
            Self::InvalidRequestBody(_) => "INVALID_REQUEST_BODY",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for WebservicesError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Http(e) => return e.clone().into_response(),
            Self::EventListenerNotFound => StatusCode::NOT_FOUND,
            Self::InvalidNotifierType(_)
            | Self::InvalidEventType(_)
            | Self::MissingEventTypes
            | Self::InvalidNotifierConfig
            | Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Only 500s are logged, with the anyhow chain.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
