//! Identifier newtypes
//!
//! Snapshots are re-created for every study version, so a snapshot row has a
//! version-scoped [`SnapshotId`] while the question line, answer or list
//! entity it copies keeps a stable [`DomainId`]. Matching across versions is
//! always done on the `DomainId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh identifier (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Identifier of one study version
    StudyId
);

uuid_id!(
    /// Version-scoped identifier of a snapshot row
    SnapshotId
);

uuid_id!(
    /// Stable identity of the domain object a snapshot copies
    DomainId
);

uuid_id!(
    /// Identifier of a questionnaire module
    ModuleId
);

uuid_id!(
    /// Unique identifier for a single request or operation
    RequestId
);

uuid_id!(
    /// Trace identifier for correlating operations across boundaries
    TraceId
);

/// Identifier assigned by the changelog store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangelogId(pub i64);

impl fmt::Display for ChangelogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
