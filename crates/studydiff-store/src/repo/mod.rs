//! Repository layer mapping studies, snapshots and changelog rows to SQLite

mod columns;
pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;
