//! Error kinds reported by the persistence and auth layers, and their HTTP mapping.

use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// A single-row query matched nothing.
    #[error("not found: {0}")]
    NotFound(String),
    /// A single-row query matched more than one row.
    #[error("internal: {0}")]
    Internal(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("store: {0}")]
    Store(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    /// Classify a failure raised by a mutating statement. Integrity violations
    /// are reported as constraint failures, everything else as a store failure.
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation()
            {
                return AppError::Constraint(db.message().to_string());
            }
        }
        AppError::Store(err)
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal_error",
            AppError::Constraint(_) => "constraint_violation",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Validation(_) => "validation_error",
            AppError::Store(_) => "store_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Constraint(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// Extractor rejections are client errors and share the JSON error body.
macro_rules! rejection_into_validation {
    ($($rejection:ty),*) => {
        $(impl From<$rejection> for AppError {
            fn from(rejection: $rejection) -> Self {
                AppError::Validation(rejection.body_text())
            }
        })*
    };
}

rejection_into_validation!(JsonRejection, QueryRejection, PathRejection, MultipartRejection);

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // store messages can leak schema details
        let message = match &self {
            AppError::Store(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}
