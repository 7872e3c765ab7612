//! Descriptor tables for persisted row types.
//!
//! Each row type declares, once and statically, the ordered list of columns it
//! writes and how to read each value out of an instance. Mapping an instance
//! stamps its timestamp column (if any) with the current second and then
//! yields `(column, value)` pairs in declaration order.

use chrono::Utc;

use crate::{clause::check_ident, error::MappingError, schema};

// ─── Value ───────────────────────────────────────────────────────────────────

/// A single bound statement argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  Null,
  Integer(i64),
  Text(String),
  Bool(bool),
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Value::Integer(v) }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self { Value::Bool(v) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Value::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Value::Text(v.to_owned()) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Value::Null, Into::into) }
}

// ─── Descriptor ──────────────────────────────────────────────────────────────

/// One persisted column and the accessor reading its value.
pub struct Column<T: 'static> {
  pub name: &'static str,
  pub get:  fn(&T) -> Value,
}

/// The column stamped with the write time and the setter that stamps it.
pub struct Timestamp<T: 'static> {
  pub column: &'static str,
  pub set:    fn(&mut T, i64),
}

/// The static description of how a row type maps onto columns.
pub struct Descriptor<T: 'static> {
  pub columns:   &'static [Column<T>],
  pub timestamp: Option<Timestamp<T>>,
}

/// A row type with a descriptor table.
pub trait Entity: Sized + Send + 'static {
  const DESCRIPTOR: Descriptor<Self>;
}

/// Stamp `row`'s timestamp and return its `(column, value)` pairs in
/// declaration order.
pub fn map<T: Entity>(row: &mut T) -> Result<Vec<(&'static str, Value)>, MappingError> {
  map_at(row, Utc::now().timestamp())
}

pub(crate) fn map_at<T: Entity>(
  row: &mut T,
  now: i64,
) -> Result<Vec<(&'static str, Value)>, MappingError> {
  let desc = &T::DESCRIPTOR;

  for (i, col) in desc.columns.iter().enumerate() {
    check_ident(col.name)?;
    if desc.columns[..i].iter().any(|c| c.name == col.name) {
      return Err(MappingError::DuplicateColumn { column: col.name });
    }
  }

  if let Some(ts) = &desc.timestamp {
    if !desc.columns.iter().any(|c| c.name == ts.column) {
      return Err(MappingError::MissingTimestamp { column: ts.column });
    }
    (ts.set)(row, now);
  }

  Ok(desc.columns.iter().map(|c| (c.name, (c.get)(row))).collect())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A row of the `words` table.
#[derive(Debug, Clone, Default)]
pub struct WordRow {
  pub word:        String,
  pub create_time: i64,
}

impl WordRow {
  pub fn new(word: impl Into<String>) -> Self {
    Self { word: word.into(), create_time: 0 }
  }
}

impl Entity for WordRow {
  const DESCRIPTOR: Descriptor<Self> = Descriptor {
    columns:   &[
      Column { name: schema::WORD, get: |r| Value::Text(r.word.clone()) },
      Column { name: schema::CREATE_TIME, get: |r| Value::Integer(r.create_time) },
    ],
    timestamp: Some(Timestamp {
      column: schema::CREATE_TIME,
      set:    |r, t| r.create_time = t,
    }),
  };
}

/// A row of the `context` table.
#[derive(Debug, Clone, Default)]
pub struct ContextRow {
  pub word:        i64,
  pub context:     String,
  pub create_time: i64,
}

impl ContextRow {
  pub fn new(word: i64, context: impl Into<String>) -> Self {
    Self { word, context: context.into(), create_time: 0 }
  }
}

impl Entity for ContextRow {
  const DESCRIPTOR: Descriptor<Self> = Descriptor {
    columns:   &[
      Column { name: schema::WORD, get: |r| Value::Integer(r.word) },
      Column { name: schema::CONTEXT_TEXT, get: |r| Value::Text(r.context.clone()) },
      Column { name: schema::CREATE_TIME, get: |r| Value::Integer(r.create_time) },
    ],
    timestamp: Some(Timestamp {
      column: schema::CREATE_TIME,
      set:    |r, t| r.create_time = t,
    }),
  };
}

/// A row of the `define` table.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRow {
  pub word:        i64,
  pub category:    String,
  pub define:      String,
  pub create_time: i64,
}

impl DefinitionRow {
  pub fn new(word: i64, category: impl Into<String>, define: impl Into<String>) -> Self {
    Self { word, category: category.into(), define: define.into(), create_time: 0 }
  }
}

impl Entity for DefinitionRow {
  const DESCRIPTOR: Descriptor<Self> = Descriptor {
    columns:   &[
      Column { name: schema::WORD, get: |r| Value::Integer(r.word) },
      Column { name: schema::CATEGORY, get: |r| Value::Text(r.category.clone()) },
      Column { name: schema::DEFINE_TEXT, get: |r| Value::Text(r.define.clone()) },
      Column { name: schema::CREATE_TIME, get: |r| Value::Integer(r.create_time) },
    ],
    timestamp: Some(Timestamp {
      column: schema::CREATE_TIME,
      set:    |r, t| r.create_time = t,
    }),
  };
}

/// A row of the `mastered` table.
#[derive(Debug, Clone, Default)]
pub struct MasteryRow {
  pub word:        i64,
  pub mastered:    bool,
  pub update_time: i64,
}

impl MasteryRow {
  pub fn new(word: i64, mastered: bool) -> Self {
    Self { word, mastered, update_time: 0 }
  }
}

impl Entity for MasteryRow {
  const DESCRIPTOR: Descriptor<Self> = Descriptor {
    columns:   &[
      Column { name: schema::WORD, get: |r| Value::Integer(r.word) },
      Column { name: schema::MASTERED_FLAG, get: |r| Value::Bool(r.mastered) },
      Column { name: schema::UPDATE_TIME, get: |r| Value::Integer(r.update_time) },
    ],
    timestamp: Some(Timestamp {
      column: schema::UPDATE_TIME,
      set:    |r, t| r.update_time = t,
    }),
  };
}
