//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! core diffing logic and the SQLite store.

pub mod changelog;
pub mod context;
pub mod engine_command;
