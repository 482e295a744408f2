//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Services return the domain variants (`Validation`, `Auth`, `Conflict`, `NotFound`,
//! `Forbidden`); the request boundary turns every variant into an apology page carrying
//! the message and an HTTP status code, except `LoginRequired`, which becomes a redirect
//! to the login form.
//!
//! `From` implementations for `sqlx::Error`, `sqlx::migrate::MigrateError`,
//! `bcrypt::BcryptError` and `tera::Error` allow the `?` operator throughout.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use std::fmt;

use crate::views;

/// Message shown to clients for failures whose details must stay in the logs.
const INTERNAL_MESSAGE: &str = "something went wrong, please try again";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed user input (HTTP 403 in task and login flows).
    Validation(String),
    /// Bad credentials. Deliberately the same for an unknown user and a wrong password.
    Auth(String),
    /// The username is already registered (HTTP 400).
    Conflict(String),
    /// The targeted task does not exist (HTTP 404).
    NotFound(String),
    /// The targeted task belongs to another user (HTTP 403).
    Forbidden(String),
    /// A request the registration flow or the form decoder rejected (HTTP 400).
    BadRequest(String),
    /// No user is bound to the current session; answered with a redirect to `/login`.
    LoginRequired,
    /// Errors originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Unexpected server-side errors such as hashing or rendering failures (HTTP 500).
    InternalServerError(String),
    /// Invalid process configuration. Only surfaces during startup.
    Configuration(String),
}

impl AppError {
    /// The message shown on the apology page.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::Auth(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg) => msg,
            AppError::LoginRequired => "you must log in first",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::Configuration(_) => INTERNAL_MESSAGE,
        }
    }

    /// Re-labels validation failures as 400s, the status the registration form reports them with.
    pub fn into_registration_error(self) -> AppError {
        match self {
            AppError::Validation(msg) => AppError::BadRequest(msg),
            other => other,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Auth(msg) => write!(f, "Authentication Error: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::LoginRequired => write!(f, "Login Required"),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into apology pages (or the login redirect).
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Auth(_) | AppError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::Conflict(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LoginRequired => StatusCode::FOUND,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::LoginRequired => HttpResponse::Found()
                .insert_header((header::LOCATION, "/login"))
                .finish(),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::Configuration(_) => {
                log::error!("{}", self);
                views::apology(self.public_message(), self.status_code())
            }
            _ => views::apology(self.public_message(), self.status_code()),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound`, unique-constraint violations to `Conflict`
/// (the only unique column is `users.username`), everything else to `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("username is already taken".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(format!("Failed to run migrations: {}", error))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<tera::Error> for AppError {
    fn from(error: tera::Error) -> AppError {
        AppError::InternalServerError(format!("Failed to render template: {}", error))
    }
}
