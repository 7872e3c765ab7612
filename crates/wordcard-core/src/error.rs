//! Error types for `wordcard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("word must not be empty")]
  EmptyWord,

  #[error("context for {0:?} must not be empty")]
  EmptyContext(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of a backend failure, used by the HTTP layer to pick
/// a response without inspecting backend-specific variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  /// A lookup by word text matched no row.
  NotFound,
  /// The caller supplied something malformed.
  Invalid,
  /// The caller aborted the operation or its deadline elapsed.
  Cancelled,
  /// Everything else: constraint violations, I/O, connectivity.
  Internal,
}

/// Implemented by backend error types so callers can classify them.
pub trait Classify {
  fn class(&self) -> ErrorClass;
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Error::EmptyWord | Error::EmptyContext(_) => ErrorClass::Invalid,
    }
  }
}
