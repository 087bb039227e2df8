//! Column decoding for text-encoded ids, enum codes and dates

use rusqlite::types::Type;
use rusqlite::Row;
use std::str::FromStr;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn conversion<E: Into<BoxError>>(idx: usize, err: E) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

/// Read a non-null text column and parse it
pub(crate) fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Into<BoxError>,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion(idx, e))
}

/// Read a nullable text column and parse it when present
pub(crate) fn parsed_opt<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: Into<BoxError>,
{
    let text: Option<String> = row.get(idx)?;
    text.map(|t| t.parse().map_err(|e| conversion(idx, e)))
        .transpose()
}

/// Nullable id or code rendered for storage
pub(crate) fn text_opt<T: ToString>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}
