//! API error taxonomy and its HTTP mapping.
//!
//! Every failure a handler can produce is one of these variants; internal
//! detail (driver errors, hash library errors) is logged server-side and
//! never serialized to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No token provided")]
    TokenMissing,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("User with this email already exists")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Cannot delete your own account")]
    SelfDeletion,

    /// A connection-level database failure, the only class a caller may
    /// retry later. Other driver errors become [`Error::Internal`]; see
    /// the `From` impl below.
    #[error("Database connection failed")]
    Store(sqlx::Error),

    #[error("Internal server error")]
    HashingUnavailable,

    /// A stored hash did not parse as a bcrypt hash.
    #[error("Internal server error")]
    InvalidHashFormat,

    #[error("{0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal,
}

impl Error {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::TokenMissing
            | Self::TokenInvalid
            | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::DuplicateEmail | Self::SelfDeletion | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::HashingUnavailable | Self::InvalidHashFormat | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // Reachable-again-later failures; the client sees 503.
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Store(err),
            // Anything else (decode failures, constraint violations) is a
            // bug or corrupt data, not something a retry fixes.
            other => {
                error!("Store error: {other}");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Self::Store(ref err) = self {
            error!("Store error: {err}");
        }

        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::TokenMissing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::TokenInvalid.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Forbidden("nope").status(), StatusCode::FORBIDDEN);
        assert_eq!(Error::SelfDeletion.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::Store(sqlx::Error::PoolClosed).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::HashingUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Validation("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages_do_not_leak_detail() {
        let err = Error::Store(sqlx::Error::PoolClosed);
        assert_eq!(err.to_string(), "Database connection failed");

        // Unknown email and wrong password share one message.
        assert_eq!(Error::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_sqlx_errors_split_by_retryability() {
        let down = Error::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(down, Error::Store(_)));
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);

        // A decode failure (e.g. a corrupt role value) is not retryable.
        let corrupt = Error::from(sqlx::Error::Decode("unknown role".into()));
        assert!(matches!(corrupt, Error::Internal));
        assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
