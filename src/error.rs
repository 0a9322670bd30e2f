//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Credential and range failures map to fixed, detail-free client responses; everything
//! else is rendered as a JSON body of the form `{"error": "..."}`.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can return it
//! directly, and provides `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors` and `bcrypt::BcryptError` for use with `?`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Body returned when sign-up hits an existing username.
pub const DUPLICATE_USERNAME_MESSAGE: &str = "This username is already used";
/// Body returned for every failed sign-in, whatever the cause.
pub const BAD_CREDENTIALS_MESSAGE: &str = "Incorrect credentials";

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Sign-up with a username that is already taken (HTTP 400).
    DuplicateUsername,
    /// Unknown user or wrong password. Both cases produce the same response (HTTP 401).
    BadCredentials,
    /// The request needs an authenticated session and has none (HTTP 401).
    Unauthorized(String),
    /// An authenticated identity no longer maps to a stored user (HTTP 401).
    UsernameNotFound(String),
    /// Pagination bounds are not positive or are reversed (HTTP 400, empty body).
    InvalidRange,
    /// A requested resource was not found (HTTP 404, empty body).
    NotFound(String),
    /// Represents an error due to failed input validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// Represents an error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::DuplicateUsername => write!(f, "Duplicate username"),
            AppError::BadCredentials => write!(f, "Bad credentials"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::UsernameNotFound(msg) => write!(f, "Username not found: {}", msg),
            AppError::InvalidRange => write!(f, "Invalid range"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername | AppError::InvalidRange => StatusCode::BAD_REQUEST,
            AppError::BadCredentials
            | AppError::Unauthorized(_)
            | AppError::UsernameNotFound(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::DuplicateUsername => response.body(DUPLICATE_USERNAME_MESSAGE),
            AppError::BadCredentials => response.body(BAD_CREDENTIALS_MESSAGE),
            AppError::InvalidRange | AppError::NotFound(_) => response.finish(),
            // The driver message stays in the server log.
            AppError::DatabaseError(msg) => {
                log::error!("database error: {}", msg);
                response.json(json!({ "error": "Database error" }))
            }
            AppError::Unauthorized(msg)
            | AppError::UsernameNotFound(msg)
            | AppError::ValidationError(msg)
            | AppError::InternalServerError(msg) => response.json(json!({ "error": msg })),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound` and a unique-constraint violation becomes
/// `DuplicateUsername` (the only unique column is `users.username`).
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                AppError::DuplicateUsername
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}
