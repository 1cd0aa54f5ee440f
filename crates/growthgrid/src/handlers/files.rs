//! Serves uploaded files from the object store.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{handlers::AppError, state::AppState};

/// Serve a stored object (GET /files/{*key}).
///
/// Object keys are unguessable, so the route does not require a session.
pub async fn serve_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let object = state
        .objects
        .get(&key)
        .await?
        .ok_or_else(|| AppError::not_found("File", &key))?;

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            (
                header::CACHE_CONTROL,
                "private, max-age=3600".to_string(),
            ),
        ],
        object.bytes,
    )
        .into_response())
}
