//! Error type for `wordcard-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;
use wordcard_core::{Classify, ErrorClass};

use crate::entity::Value;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] wordcard_core::Error),

  #[error("mapping error: {0}")]
  Mapping(#[from] MappingError),

  /// A statement failed. Carries the generated SQL and its arguments.
  #[error("{cause}\nsql: {query}\nargs: {args:?}")]
  Store {
    query: String,
    args:  Vec<Value>,
    #[source]
    cause: rusqlite::Error,
  },

  #[error("sqlite error: {0}")]
  Sqlite(rusqlite::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("no such word: {0:?}")]
  NotFound(String),

  #[error("operation cancelled")]
  Cancelled,
}

/// A malformed row descriptor or condition list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
  #[error("column {column:?} is mapped more than once")]
  DuplicateColumn { column: &'static str },

  #[error("timestamp column {column:?} is not one of the mapped columns")]
  MissingTimestamp { column: &'static str },

  #[error("{0:?} is not a valid SQL identifier")]
  InvalidIdentifier(String),

  #[error("update of {table:?} assigns no columns")]
  EmptyAssignments { table: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// Annotate a failed statement with its query text and arguments.
  /// Interrupted statements become [`Error::Cancelled`].
  pub(crate) fn store(query: &str, args: &[Value], cause: rusqlite::Error) -> Self {
    if is_interrupt(&cause) {
      return Error::Cancelled;
    }
    Error::Store { query: query.to_owned(), args: args.to_vec(), cause }
  }

  /// `true` if the failure is a UNIQUE / FOREIGN KEY / NOT NULL violation.
  pub fn is_constraint_violation(&self) -> bool {
    let cause = match self {
      Error::Store { cause, .. } | Error::Sqlite(cause) => cause,
      Error::Database(tokio_rusqlite::Error::Rusqlite(cause)) => cause,
      _ => return false,
    };
    cause.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    if is_interrupt(&e) { Error::Cancelled } else { Error::Sqlite(e) }
  }
}

fn is_interrupt(e: &rusqlite::Error) -> bool {
  e.sqlite_error_code() == Some(ErrorCode::OperationInterrupted)
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Error::Core(e) => e.class(),
      Error::Mapping(_) => ErrorClass::Invalid,
      Error::NotFound(_) => ErrorClass::NotFound,
      Error::Cancelled => ErrorClass::Cancelled,
      Error::Store { .. } | Error::Sqlite(_) | Error::Database(_) => ErrorClass::Internal,
    }
  }
}
