//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every handler returns `Result<HttpResponse, AppError>`, so each request has exactly one
//! place where its response is produced, whether it succeeds or fails.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application errors
//! into HTTP responses with a `{"message": ...}` JSON body. Input refusals use the
//! `Rejected` variant, which answers `200 OK` with a descriptive message rather than a
//! client-error status.
//!
//! Bodies that cannot be read as JSON at all are turned into `AppError` by
//! `json_payload_error`, which the route scopes install through `web::JsonConfig`.
//!
//! `From` implementations exist for `StoreError`, `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error`, `bcrypt::BcryptError`
//! and `actix_web::error::BlockingError`, allowing for easy conversion using `?`.

use actix_web::{
    error::{BlockingError, JsonPayloadError, ResponseError},
    http::StatusCode,
    HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// The request was understood but refused (bad credentials, missing fields,
    /// duplicate email). Answered with `200 OK` and a descriptive message.
    Rejected(String),
    /// Represents an unauthorized access attempt (HTTP 401).
    /// Used when a caller identity is required but missing or invalid.
    Unauthorized(String),
    /// Represents a client-side error due to a malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Represents a situation where a requested resource was not found (HTTP 404).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from the user store (HTTP 500).
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Rejected(msg) => write!(f, "Rejected: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Rejected(_) => StatusCode::OK,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Rejected(msg)
            | AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg) => msg.as_str(),
            // Server-side details go to the log, not to the client.
            AppError::InternalServerError(detail) | AppError::DatabaseError(detail) => {
                log::error!("{}", detail);
                "Internal server error"
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

/// Picks the message of the first failing field, ordering fields by name so the
/// answer is stable across runs.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().copied().collect();
    fields.sort_unstable();

    fields
        .first()
        .and_then(|field| field_errors.get(field))
        .and_then(|errs| errs.iter().find_map(|e| e.message.as_ref()))
        .map(|msg| msg.to_string())
        .unwrap_or_else(|| errors.to_string())
}

/// Maps a body that could not be extracted as JSON to an `AppError` built by `reject`.
///
/// A missing, empty or non-JSON body reads as `{}`, so it answers `empty_body`, the
/// message the field checks give an empty payload. A body with wrongly typed or
/// malformed content answers with the parser's description.
pub fn json_payload_error(
    err: JsonPayloadError,
    empty_body: &str,
    reject: fn(String) -> AppError,
) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => empty_body.to_string(),
        JsonPayloadError::Deserialize(e) if e.is_eof() => empty_body.to_string(),
        JsonPayloadError::Deserialize(e) => format!("Invalid request body: {}", e),
        other => format!("Invalid request body: {}", other),
    };
    log::debug!("unreadable JSON payload: {}", err);
    reject(message).into()
}

/// Converts `validator::ValidationErrors` into `AppError::Rejected`.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::Rejected(first_validation_message(&errors))
    }
}

/// Converts `StoreError` into `AppError`.
///
/// Missing users or tasks become `404`s named after the entity; backend failures
/// become `DatabaseError`.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound { entity_type, .. } => {
                AppError::NotFound(format!("{} not found", entity_type))
            }
            StoreError::AlreadyExists { .. } => AppError::BadRequest(error.to_string()),
            StoreError::Database(e) => AppError::DatabaseError(e.to_string()),
            StoreError::Serialization(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// Raised when the blocking thread pool running a bcrypt job is gone.
impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
