//! Checksum validation for migrations
//!
//! A migration's SHA256 is recorded when it is applied; a later run with
//! different SQL under the same id is rejected.

use crate::errors::{checksum_mismatch, Result};
use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check embedded SQL against the checksum recorded when it was applied.
///
/// Rows without a recorded checksum are accepted.
pub fn verify_checksum(migration_id: &str, sql: &str, recorded: Option<&str>) -> Result<()> {
    let actual = compute_checksum(sql);
    match recorded {
        Some(expected) if expected != actual => {
            Err(checksum_mismatch(migration_id, expected, &actual))
        }
        _ => Ok(()),
    }
}
