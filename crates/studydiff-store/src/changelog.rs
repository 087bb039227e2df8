//! Changelog sink backed by the `study_changelog` table

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::repo::SqliteRepo;
use rusqlite::Connection;
use studydiff_core::model::ChangelogRecord;
use studydiff_core::ChangelogSink;
use studydiff_core_types::ChangelogId;

/// Appends changelog rows through a connection or transaction
pub struct SqliteChangelogSink<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteChangelogSink<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ChangelogSink for SqliteChangelogSink<'_> {
    fn create(&mut self, record: &ChangelogRecord) -> Result<ChangelogId> {
        SqliteRepo::insert_changelog(self.conn, record)
    }
}
