//! Error handling for studydiff-store
//!
//! Wraps studydiff-core ExError with store-specific helpers

use studydiff_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a decode error for a stored value that does not parse
pub fn decode_error(column: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Decode)
        .with_op("sqlite_decode")
        .with_message(format!("cannot decode column {}: {}", column, reason))
}

/// Create a database error from rusqlite::Error
///
/// Column conversion failures become `Decode`; everything else is
/// `Persistence`.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(idx, _, source) => {
            decode_error(&format!("#{}", idx), &source.to_string())
        }
        other => ExError::new(ExErrorKind::Persistence)
            .with_op("sqlite")
            .with_message(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_failure_is_decode() {
        let err = rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            "unknown change kind 'renamed'".into(),
        );
        let ex = from_rusqlite(err);
        assert_eq!(ex.kind(), ExErrorKind::Decode);
        assert!(ex.message().contains("renamed"));
    }

    #[test]
    fn test_other_failures_are_persistence() {
        let ex = from_rusqlite(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(ex.kind(), ExErrorKind::Persistence);
        assert_eq!(ex.op(), Some("sqlite"));
    }
}
