use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use growthgrid_core::auth::CredentialError;
use growthgrid_core::storage::RepositoryError;
use serde_json::json;
use thiserror::Error;

/// Auth errors for the growthgrid_auth crate.
///
/// Wraps the core credential and repository errors and adds the failures
/// that only exist once hashing and token signing are involved.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed email or out-of-bounds password.
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// Unknown email or wrong password at login.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Wrong current password on password change.
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// Registration with an email that already has an account.
    #[error("Email already registered")]
    EmailTaken,

    /// Missing, malformed or expired access token.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Hashing or token signing failed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// User storage failed.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Credentials(_) | AuthError::IncorrectPassword => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Storage(err) => match err {
                RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                RepositoryError::AlreadyExists { .. } => StatusCode::CONFLICT,
                RepositoryError::ConnectionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
                // Users are built server-side, so bad data here is ours.
                RepositoryError::InvalidData(_)
                | RepositoryError::QueryFailed(_)
                | RepositoryError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!("Auth error: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Credentials(CredentialError::InvalidEmail).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::Storage(RepositoryError::ConnectionFailed("down".to_string()))
                .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::Storage(RepositoryError::NotFound {
                entity_type: "User",
                id: "gone".to_string(),
            })
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::Storage(RepositoryError::InvalidData("bad email".to_string()))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response = AuthError::Crypto("bad salt".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "Internal server error");
    }
}
