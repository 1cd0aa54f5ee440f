mod attachments;
mod error;
mod operations;
mod requests;
mod types;

pub use attachments::{
    essence, file_url, new_object_key, object_key, sanitize_file_name, validate_upload,
    ALLOWED_CONTENT_TYPES, MAX_UPLOAD_BYTES,
};
pub use error::JournalError;
pub use operations::{
    build_links, compare_newest_first, normalize_tag_name, normalize_tags, normalize_title,
    paginate_entries, validate_entry,
};
pub use requests::{
    CreateEntryRequest, EntryQuery, LinkInput, UpdateEntryRequest, DEFAULT_PAGE_LIMIT,
    MAX_PAGE_LIMIT, MIN_PAGE_LIMIT,
};
pub use types::{Attachment, Entry, EntryPage, Link, Tag, User};
