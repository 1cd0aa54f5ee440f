//! Pure functions for serializing/deserializing aggregates to/from cache bytes.
//!
//! These functions use JSON serialization for cache storage, providing human-readable
//! cache values that are easy to debug and inspect.

use thiserror::Error;

use crate::analytics::{HeatmapPoint, SummaryReport};

use super::CacheError;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

impl From<SerializationError> for CacheError {
    fn from(err: SerializationError) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes a heatmap series to JSON bytes.
pub fn serialize_heatmap(points: &[HeatmapPoint]) -> Result<Vec<u8>> {
    serde_json::to_vec(points).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a heatmap series.
pub fn deserialize_heatmap(bytes: &[u8]) -> Result<Vec<HeatmapPoint>> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a summary report to JSON bytes.
pub fn serialize_summary(summary: &SummaryReport) -> Result<Vec<u8>> {
    serde_json::to_vec(summary).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a summary report.
pub fn deserialize_summary(bytes: &[u8]) -> Result<SummaryReport> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_roundtrip_heatmap() {
        let points = vec![
            HeatmapPoint::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), 2),
            HeatmapPoint::new(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), 1),
        ];

        let bytes = serialize_heatmap(&points).expect("serialize should succeed");
        let deserialized = deserialize_heatmap(&bytes).expect("deserialize should succeed");

        assert_eq!(points, deserialized);
    }

    #[test]
    fn test_roundtrip_summary_with_null_tag() {
        let summary = SummaryReport::empty();

        let bytes = serialize_summary(&summary).expect("serialize should succeed");
        let deserialized = deserialize_summary(&bytes).expect("deserialize should succeed");

        assert_eq!(summary, deserialized);
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        let result = deserialize_summary(b"not json");
        assert!(matches!(
            result,
            Err(SerializationError::DeserializeFailed(_))
        ));
    }

    #[test]
    fn test_failure_surfaces_as_cache_error() {
        let err = deserialize_heatmap(b"{").unwrap_err();

        assert!(matches!(
            CacheError::from(err),
            CacheError::Serialization(message) if message.starts_with("Failed to deserialize")
        ));
    }

    #[test]
    fn test_heatmap_bytes_are_not_a_summary() {
        let bytes = serialize_heatmap(&[]).unwrap();
        assert!(deserialize_summary(&bytes).is_err());
    }
}
