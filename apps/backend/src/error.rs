use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::DomainError;
use crate::errors::ErrorKind;

/// Wire shape of a failed response body.
#[derive(Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    #[serde(rename = "type")]
    pub type_: String,
    pub error: ErrorDetails,
}

#[derive(Serialize)]
pub struct ErrorDetails {
    pub kind: &'static str,
    pub message: String,
}

/// Application-level error used by handlers, the dispatcher, and the engine.
///
/// Domain errors carry their own kind; the remaining variants cover stateless
/// validation, registry conflicts, and system failures.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { kind: ErrorKind, detail: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Not found: {detail}")]
    NotFound { kind: ErrorKind, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { kind: ErrorKind, detail: String },
    #[error("Capacity: {detail}")]
    Capacity { kind: ErrorKind, detail: String },
    #[error("Command cancelled: deadline elapsed")]
    Cancelled,
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn validation(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            detail: detail.into(),
        }
    }

    pub fn not_found(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            detail: detail.into(),
        }
    }

    pub fn conflict(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            detail: detail.into(),
        }
    }

    pub fn capacity(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Capacity {
            kind,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    /// Stable kind surfaced in the response.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation { kind, .. } => *kind,
            AppError::Domain(err) => err.kind(),
            AppError::NotFound { kind, .. } => *kind,
            AppError::Conflict { kind, .. } => *kind,
            AppError::Capacity { kind, .. } => *kind,
            AppError::Cancelled => ErrorKind::Cancelled,
            AppError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Human-readable message for the response body.
    ///
    /// Internal errors are logged server-side and surfaced generically.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal { .. } => "An internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Domain(err) => match err {
                DomainError::NotHost(_) | DomainError::PlayerNotInSession(_) => {
                    StatusCode::FORBIDDEN
                }
                DomainError::InvalidRules(_)
                | DomainError::InvalidPlayerId(_)
                | DomainError::InvalidTargetPlayer(_) => StatusCode::BAD_REQUEST,
                DomainError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::CONFLICT,
            },
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Capacity { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        if self.status().is_server_error() {
            tracing::error!(kind = %self.kind(), error = %self, "Request failed");
        }

        HttpResponse::build(self.status()).json(ErrorBody {
            ok: false,
            type_: "error".to_string(),
            error: ErrorDetails {
                kind: self.kind().as_str(),
                message: self.public_message(),
            },
        })
    }
}
