//! Upload validation and object key construction.

use uuid::Uuid;

use super::error::JournalError;

/// Upper bound on a single upload: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Media types accepted for attachments.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "text/markdown",
];

/// Strips parameters (`; charset=...`) and lowercases a content type.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Checks an upload's media type and size.
///
/// Returns the normalized content type on success.
pub fn validate_upload(content_type: &str, size: u64) -> Result<String, JournalError> {
    let content_type = essence(content_type);
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(JournalError::UnsupportedMediaType(content_type));
    }
    if size == 0 {
        return Err(JournalError::EmptyFile);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(JournalError::FileTooLarge {
            size,
            max_mib: MAX_UPLOAD_BYTES / (1024 * 1024),
        });
    }
    Ok(content_type)
}

/// Reduces a client-supplied file name to its final path component.
///
/// Falls back to `"file"` when nothing usable remains.
pub fn sanitize_file_name(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or("file")
        .to_string()
}

/// Builds the object key `entries/{entry_id}/{prefix}_{file_name}`.
pub fn object_key(entry_id: Uuid, unique_prefix: &str, file_name: &str) -> String {
    format!("entries/{entry_id}/{unique_prefix}_{file_name}")
}

/// Builds an object key with a fresh 8-hex-digit prefix.
pub fn new_object_key(entry_id: Uuid, file_name: &str) -> String {
    let prefix = Uuid::new_v4().simple().to_string();
    object_key(entry_id, &prefix[..8], file_name)
}

/// Public URL under which the server exposes `key`.
pub fn file_url(public_base_url: &str, key: &str) -> String {
    format!("{}/files/{}", public_base_url.trim_end_matches('/'), key)
}
