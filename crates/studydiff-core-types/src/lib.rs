//! Core types shared across the studydiff crates
//!
//! This crate holds the identifier newtypes and the canonical logging schema
//! used by the error facility, the logging facility and the store:
//!
//! - **Identifiers**: StudyId, SnapshotId, DomainId, ModuleId, ChangelogId
//! - **Correlation**: RequestId, TraceId
//! - **Schema constants**: Canonical field keys and event names

pub mod ids;
pub mod schema;

pub use ids::{ChangelogId, DomainId, ModuleId, RequestId, SnapshotId, StudyId, TraceId};
