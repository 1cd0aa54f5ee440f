use thiserror::Error;

/// Errors raised while validating journal input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JournalError {
    #[error("Entry content cannot be empty")]
    EmptyContent,
    #[error("Link URL cannot be empty")]
    EmptyLinkUrl,
    #[error("Limit must be between {min} and {max}, got {got}")]
    InvalidLimit { min: u32, max: u32, got: u32 },
    #[error("File type '{0}' is not allowed")]
    UnsupportedMediaType(String),
    #[error("File exceeds the {max_mib} MB size limit")]
    FileTooLarge { size: u64, max_mib: u64 },
    #[error("Uploaded file is empty")]
    EmptyFile,
}
