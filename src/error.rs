//! Unified application error model and mapping helpers.
//! Every failure in the request path is a deterministic policy decision, so
//! the taxonomy is small and terminal: no variant is retryable and none is
//! fatal to the process. The HTTP mapping lives here; the wire body is
//! produced by the server module.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// Missing or empty required fields in the request body.
    #[error("{message}")]
    Validation { message: String },
    /// Registration attempted with an email that already has a user.
    #[error("{message}")]
    EmailTaken { message: String },
    /// Login failed. Deliberately identical for unknown email and wrong
    /// password so the endpoint does not leak which emails are registered.
    #[error("{message}")]
    InvalidCredentials { message: String },
    /// No session, or a session that is malformed, forged or expired.
    /// All of those collapse to this one variant.
    #[error("{message}")]
    Unauthenticated { message: String },
    /// Valid session, but the requester does not own the target resource.
    #[error("{message}")]
    Forbidden { message: String },
    /// Resource id absent from the store.
    #[error("{message}")]
    NotFound { message: String },
    /// Hashing/RNG failure or similar. Logged server-side; the wire body
    /// stays generic.
    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn validation<S: Into<String>>(msg: S) -> Self { AppError::Validation { message: msg.into() } }
    pub fn email_taken() -> Self { AppError::EmailTaken { message: "Email already exists".into() } }
    pub fn invalid_credentials() -> Self { AppError::InvalidCredentials { message: "Invalid credentials".into() } }
    pub fn unauthenticated<S: Into<String>>(msg: S) -> Self { AppError::Unauthenticated { message: msg.into() } }
    pub fn forbidden() -> Self { AppError::Forbidden { message: "You are not the owner of this fruit".into() } }
    pub fn not_found() -> Self { AppError::NotFound { message: "Sorry, fruit not found".into() } }
    pub fn internal<S: Into<String>>(msg: S) -> Self { AppError::Internal { message: msg.into() } }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message }
            | AppError::EmailTaken { message }
            | AppError::InvalidCredentials { message }
            | AppError::Unauthenticated { message }
            | AppError::Forbidden { message }
            | AppError::NotFound { message }
            | AppError::Internal { message } => message.as_str(),
        }
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Validation { .. } => 400,
            AppError::EmailTaken { .. } => 400,
            AppError::InvalidCredentials { .. } => 400,
            AppError::Unauthenticated { .. } => 401,
            AppError::Forbidden { .. } => 403,
            AppError::NotFound { .. } => 404,
            AppError::Internal { .. } => 500,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}
