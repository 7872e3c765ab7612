//! Encoding and decoding between [`Value`] / row types and SQLite columns.
//!
//! Booleans are stored as integers `0` / `1`. Timestamps are epoch seconds.

use rusqlite::{
  Row,
  types::{ToSql, ToSqlOutput},
};

use crate::entity::Value;

impl ToSql for Value {
  fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
    Ok(match self {
      Value::Null => ToSqlOutput::from(rusqlite::types::Null),
      Value::Integer(v) => ToSqlOutput::from(*v),
      Value::Text(v) => ToSqlOutput::from(v.as_str()),
      Value::Bool(v) => ToSqlOutput::from(*v),
    })
  }
}

// ─── Row decoders ────────────────────────────────────────────────────────────

pub fn decode_id(row: &Row<'_>) -> rusqlite::Result<i64> { row.get(0) }

pub fn decode_text(row: &Row<'_>) -> rusqlite::Result<String> { row.get(0) }

pub fn decode_flag(row: &Row<'_>) -> rusqlite::Result<bool> { row.get(0) }

/// `(category, define)` pair from the `define` table.
pub fn decode_definition(row: &Row<'_>) -> rusqlite::Result<(String, String)> {
  Ok((row.get(0)?, row.get(1)?))
}
