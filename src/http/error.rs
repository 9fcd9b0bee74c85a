//! Error types for request handling.

use std::any::Any;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::upstream::UpstreamError;

/// Generic message for faults whose cause stays server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Underlying cause of an error response.
///
/// Attached as a response extension; only rendered into the body when the
/// environment allows it (see [`attach_error_details`](crate::http::middleware::attach_error_details)).
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

/// Errors that can occur during request handling.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// Request that could not be decoded. The decoder's message is kept
    /// server-side as the detail.
    #[error("{message}: {detail}")]
    Malformed {
        message: &'static str,
        detail: String,
    },

    /// Missing, invalid or expired credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The managed backend declined the operation.
    #[error("{0}")]
    UpstreamRejection(String),

    /// The managed backend could not complete the call.
    #[error("{context}: {source}")]
    UpstreamUnavailable {
        context: String,
        #[source]
        source: UpstreamError,
    },

    /// Request body over the configured cap.
    #[error("request body too large")]
    PayloadTooLarge,

    /// No route for the requested path.
    #[error("route not found: {0}")]
    NotFound(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map an upstream failure: declined operations become 400 with the
    /// service's message, everything else a 500 under `context`.
    pub fn upstream(context: impl Into<String>, err: UpstreamError) -> Self {
        match err {
            UpstreamError::Rejected { message, .. } => Self::UpstreamRejection(message),
            other => Self::unavailable(context, other),
        }
    }

    /// Treat any upstream failure as a 500 under `context`.
    pub fn unavailable(context: impl Into<String>, err: UpstreamError) -> Self {
        Self::UpstreamUnavailable {
            context: context.into(),
            source: err,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Malformed { .. } | Self::UpstreamRejection(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Unauthorized(msg) | Self::UpstreamRejection(msg) => {
                msg.clone()
            }
            Self::Malformed { message, .. } => message.to_string(),
            Self::UpstreamUnavailable { context, .. } => context.clone(),
            Self::PayloadTooLarge => "El cuerpo de la solicitud excede el límite permitido".to_string(),
            Self::NotFound(_) => "Ruta no encontrada".to_string(),
            Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Server-side cause, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Malformed { detail, .. } => Some(detail.clone()),
            Self::UpstreamUnavailable { source, .. } => Some(source.to_string()),
            Self::Internal(detail) => Some(detail.clone()),
            _ => None,
        }
    }

    fn body(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.public_message(),
        });
        if let Self::NotFound(path) = self {
            body["path"] = Value::String(path.clone());
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let mut response = (status, Json(self.body())).into_response();
        if let Some(detail) = self.detail() {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::Malformed {
            message: "Cuerpo JSON inválido",
            detail: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Malformed {
            message: "Parámetro de ruta inválido",
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed {
            message: "Parámetros de consulta inválidos",
            detail: rejection.body_text(),
        }
    }
}

/// Response for a handler panic; installed through `CatchPanicLayer`.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Internal(detail).into_response()
}
