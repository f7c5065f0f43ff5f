use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use invitehub_http_errors::ErrorResponseData;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The `#[error]` strings here are the messages clients see, so several of
/// them are deliberately vague or identical to each other.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Database Error: {0}")]
    DbErr(#[from] diesel::result::Error),

    #[error("Database Pool Error: {0}")]
    DbPool(#[from] deadpool_diesel::PoolError),

    #[error("Auth error: {0}")]
    AuthError(#[from] invitehub_auth::Error),

    #[error("Access denied. No token provided.")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,

    #[error("You have already joined this team")]
    DuplicateJoin,

    #[error("Team not found or full")]
    TeamUnavailable,

    #[error("Team not found")]
    NotFound,

    #[error("Admin not found")]
    AdminNotFound,

    #[error("Too many join attempts. Please try again later.")]
    RateLimited,

    #[error("No changes to update")]
    NoChanges,

    #[error("{0}")]
    Validation(&'static str),

    #[error("Verification service unavailable")]
    GateUnavailable,

    #[error(transparent)]
    Generic(#[from] anyhow::Error),
}

impl Error {
    fn error_kind(&self) -> &'static str {
        match self {
            Error::DbErr(_) => "db",
            Error::DbPool(_) => "db_pool",
            Error::AuthError(_) => "auth",
            Error::Unauthenticated => "authn",
            Error::InvalidToken => "authn",
            Error::InvalidCredentials => "authn",
            Error::IncorrectCurrentPassword => "authn",
            Error::DuplicateJoin => "duplicate_join",
            Error::TeamUnavailable => "not_found",
            Error::NotFound => "not_found",
            Error::AdminNotFound => "not_found",
            Error::RateLimited => "rate_limited",
            Error::NoChanges => "validation",
            Error::Validation(_) => "validation",
            Error::GateUnavailable => "gate_unavailable",
            Error::Generic(_) => "internal_server_error",
        }
    }

    pub fn response_tuple(&self) -> (StatusCode, ErrorResponseData) {
        let status = match self {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::InvalidToken => StatusCode::BAD_REQUEST,
            Error::IncorrectCurrentPassword => StatusCode::BAD_REQUEST,
            Error::DuplicateJoin => StatusCode::BAD_REQUEST,
            Error::NoChanges => StatusCode::BAD_REQUEST,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::TeamUnavailable => StatusCode::NOT_FOUND,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::AdminNotFound => StatusCode::NOT_FOUND,
            Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Error::GateUnavailable => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            ErrorResponseData::new(self.error_kind(), self.to_string()),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (code, json) = self.response_tuple();
        (code, Json(json)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failures_share_a_message() {
        // Login failures must not reveal whether the username exists.
        let unknown_user = Error::InvalidCredentials.to_string();
        let wrong_password = Error::InvalidCredentials.to_string();
        assert_eq!(unknown_user, wrong_password);
        assert_eq!(unknown_user, "Invalid credentials");
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            Error::Unauthenticated.response_tuple().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::InvalidToken.response_tuple().0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::TeamUnavailable.response_tuple().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::RateLimited.response_tuple().0,
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            Error::GateUnavailable.response_tuple().0,
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn full_and_missing_teams_are_indistinguishable() {
        let (status, data) = Error::TeamUnavailable.response_tuple();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(data.message(), "Team not found or full");
    }
}
