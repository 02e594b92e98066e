//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Field or settings configuration that cannot be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid width '{value}' for field {field} (expected 1-12)")]
    InvalidWidth { field: String, value: String },
    #[error("invalid option '{key}' for field {field}: {reason}")]
    InvalidOption {
        field: String,
        key: String,
        reason: String,
    },
    #[error("settings: {0}")]
    Settings(String),
}

/// Fatal errors raised while models are being registered. Startup must abort on any of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("malformed tag on {model}.{field}: {reason}")]
    TagParse {
        model: String,
        field: String,
        reason: String,
    },
    #[error("first column ({model}.{field}) can't be skipped")]
    FirstFieldSkipped { model: String, field: String },
    #[error("model {0} has no fields")]
    NoFields(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("duplicate model slug: {0}")]
    DuplicateModel(String),
    #[error("unknown model group: {0}")]
    UnknownGroup(usize),
    #[error("unresolved foreign keys: {}", .0.join(", "))]
    UnresolvedForeignKeys(Vec<String>),
}

/// A single field's validation failure. Carried back to the form, never turned into a failed request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        FieldError {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("template {name}: {message}")]
    Template { name: String, message: String },
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Registration(_) | AppError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    tracing::error!(error = %e, "storage failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Template { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "template_error"),
        };
        // Storage details stay in the log.
        let message = match &self {
            AppError::Db(e) if !matches!(e, sqlx::Error::RowNotFound) => "request failed".to_string(),
            _ => self.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}
