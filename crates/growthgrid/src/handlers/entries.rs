//! Entry CRUD handlers.
//!
//! Every handler is scoped to the authenticated user. Cache invalidation
//! is handled by the invalidating repository decorator.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use growthgrid_auth::CurrentUser;
use growthgrid_core::journal::{
    CreateEntryRequest, Entry, EntryPage, EntryQuery, UpdateEntryRequest,
};

use crate::{handlers::AppError, state::AppState};

/// List entries (GET /entries).
pub async fn list_entries(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    query: Result<Query<EntryQuery>, QueryRejection>,
) -> Result<Json<EntryPage>, AppError> {
    let Query(query) = query?;
    query.validate()?;

    let page = state.entries.list_entries(user.id, &query).await?;
    Ok(Json(page))
}

/// List the user's distinct tag names (GET /entries/tags).
pub async fn list_tags(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    let tags = state.entries.list_tags(user.id).await?;
    Ok(Json(tags))
}

/// Get a single entry by ID (GET /entries/{id}).
pub async fn get_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Entry>, AppError> {
    let entry = state
        .entries
        .get_entry(user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Entry", id))?;

    Ok(Json(entry))
}

/// Create a new entry (POST /entries).
pub async fn create_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    let Json(payload) = payload?;
    let entry = payload.into_entry(user.id)?;

    let created = state.entries.create_entry(&entry).await?;

    tracing::debug!(entry_id = %created.id, date = %created.date, "Entry created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing entry (PUT /entries/{id}).
pub async fn update_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> Result<Json<Entry>, AppError> {
    let Json(payload) = payload?;

    let mut entry = state
        .entries
        .get_entry(user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Entry", id))?;

    payload.apply_to(&mut entry)?;
    let updated = state.entries.update_entry(&entry).await?;

    Ok(Json(updated))
}

/// Delete an entry (DELETE /entries/{id}).
///
/// Attachment records go with the entry; their stored files are removed
/// afterwards on a best-effort basis.
pub async fn delete_entry(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let entry = state
        .entries
        .get_entry(user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Entry", id))?;

    state.entries.delete_entry(user.id, id).await?;

    for attachment in &entry.attachments {
        if let Err(e) = state.objects.delete(&attachment.object_key).await {
            tracing::warn!(
                attachment_id = %attachment.id,
                key = %attachment.object_key,
                error = %e,
                "Failed to delete attachment object"
            );
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
