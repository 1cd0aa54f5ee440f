use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use growthgrid_core::analytics::AnalyticsError;
use growthgrid_core::journal::JournalError;
use growthgrid_core::storage::{ObjectStoreError, RepositoryError};
use serde_json::json;
use thiserror::Error;

/// A malformed request that no domain error describes.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BadRequest(pub String);

/// Application error type that wraps `anyhow::Error`.
///
/// Domain errors are recovered by downcasting and mapped to their status
/// codes. Anything unrecognized is a 500 whose details stay in the logs.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// A 404 for `entity_type` with `id`.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self(
            RepositoryError::NotFound {
                entity_type,
                id: id.to_string(),
            }
            .into(),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(BadRequest(message.into()).into())
    }

    pub fn status_code(&self) -> StatusCode {
        if self.0.is::<BadRequest>() {
            return StatusCode::BAD_REQUEST;
        }
        if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            return status_for_repository(repo_error);
        }
        if let Some(analytics_error) = self.0.downcast_ref::<AnalyticsError>() {
            let AnalyticsError::Repository(repo_error) = analytics_error;
            return status_for_repository(repo_error);
        }
        if let Some(journal_error) = self.0.downcast_ref::<JournalError>() {
            return match journal_error {
                JournalError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
        }
        if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            return rejection.status();
        }
        if let Some(rejection) = self.0.downcast_ref::<QueryRejection>() {
            return rejection.status();
        }
        if let Some(err) = self.0.downcast_ref::<MultipartError>() {
            return err.status();
        }
        if let Some(rejection) = self.0.downcast_ref::<MultipartRejection>() {
            return rejection.status();
        }
        if let Some(object_error) = self.0.downcast_ref::<ObjectStoreError>() {
            return match object_error {
                ObjectStoreError::InvalidKey(_) => StatusCode::BAD_REQUEST,
                ObjectStoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                ObjectStoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Lost connections are retryable; broken rows and queries are our fault.
fn status_for_repository(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
        RepositoryError::AlreadyExists { .. } => StatusCode::CONFLICT,
        RepositoryError::InvalidData(_) => StatusCode::BAD_REQUEST,
        RepositoryError::ConnectionFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let detail = if status_code.is_server_error() {
            tracing::error!(error = %self.0, status = %status_code, "Application error");
            match status_code {
                StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.0.to_string()
        };

        (status_code, Json(json!({ "detail": detail }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn detail(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["detail"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let response = AppError::not_found("Entry", "abc").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(detail(response).await, "Entry not found: abc");
    }

    #[tokio::test]
    async fn test_bad_request() {
        let response = AppError::bad_request("entry_id is required").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(detail(response).await, "entry_id is required");
    }

    #[test]
    fn test_journal_errors() {
        assert_eq!(
            AppError::from(JournalError::EmptyContent).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(JournalError::UnsupportedMediaType("application/zip".to_string()))
                .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(JournalError::FileTooLarge {
                size: 11 * 1024 * 1024,
                max_mib: 10
            })
            .status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_analytics_error_unwraps_repository_error() {
        let error = AnalyticsError::Repository(RepositoryError::ConnectionFailed(
            "database is locked".to_string(),
        ));

        assert_eq!(
            AppError::from(error).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_repository_errors() {
        let status = |error: RepositoryError| AppError::from(error).status_code();

        assert_eq!(
            status(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: "ada@example.com".to_string(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(RepositoryError::InvalidData("limit out of range".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(RepositoryError::QueryFailed("no such table: entries".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(RepositoryError::Serialization("bad date".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let response = AppError::from(anyhow::anyhow!("secret stack trace")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail(response).await, "Internal server error");
    }
}
