//! Attachment upload and deletion handlers.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use growthgrid_auth::CurrentUser;
use growthgrid_core::journal::{
    file_url, new_object_key, sanitize_file_name, validate_upload, Attachment,
};

use crate::{handlers::AppError, state::AppState};

/// The `file` part of an upload form.
struct UploadedFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Upload a file against an entry (POST /uploads, multipart `entry_id` + `file`).
pub async fn upload_file(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Attachment>), AppError> {
    let mut multipart = multipart?;

    let mut entry_id = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("entry_id") => {
                let text = field.text().await?;
                let id = Uuid::parse_str(text.trim())
                    .map_err(|_| AppError::bad_request("entry_id must be a UUID"))?;
                entry_id = Some(id);
            }
            Some("file") => {
                let file_name = sanitize_file_name(field.file_name());
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let entry_id = entry_id.ok_or_else(|| AppError::bad_request("entry_id is required"))?;
    let file = file.ok_or_else(|| AppError::bad_request("file is required"))?;

    state
        .entries
        .get_entry(user.id, entry_id)
        .await?
        .ok_or_else(|| AppError::not_found("Entry", entry_id))?;

    let size_bytes = file.bytes.len() as u64;
    let content_type = validate_upload(&file.content_type, size_bytes)?;

    let object_key = new_object_key(entry_id, &file.file_name);
    state
        .objects
        .put(&object_key, file.bytes, &content_type)
        .await?;

    let attachment = Attachment {
        id: Uuid::new_v4(),
        entry_id,
        file_name: file.file_name,
        file_url: file_url(&state.public_base_url, &object_key),
        content_type,
        size_bytes,
        object_key,
        uploaded_at: state.clock.now(),
    };

    if let Err(e) = state.attachments.create_attachment(&attachment).await {
        // The entry may have been deleted since the ownership check.
        if let Err(cleanup) = state.objects.delete(&attachment.object_key).await {
            tracing::warn!(key = %attachment.object_key, error = %cleanup, "Failed to remove orphaned object");
        }
        return Err(e.into());
    }

    tracing::info!(
        attachment_id = %attachment.id,
        %entry_id,
        size = size_bytes,
        content_type = %attachment.content_type,
        "Attachment uploaded"
    );
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// Delete an attachment and its stored file (DELETE /uploads/{id}).
pub async fn delete_upload(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let attachment = state
        .attachments
        .get_attachment(user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Attachment", id))?;

    state.objects.delete(&attachment.object_key).await?;
    state.attachments.delete_attachment(id).await?;

    tracing::info!(attachment_id = %id, "Attachment deleted");
    Ok(StatusCode::NO_CONTENT)
}
