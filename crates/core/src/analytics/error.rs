use thiserror::Error;

use crate::storage::RepositoryError;

/// Errors surfaced by the aggregation engine.
///
/// Cache failures never appear here: a broken cache degrades to a miss.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
