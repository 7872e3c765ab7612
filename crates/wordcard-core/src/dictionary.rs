//! The `Dictionary` trait — the boundary toward external definition providers.

use std::future::Future;

use crate::record::WordDefinition;

/// A source of word definitions.
///
/// Implemented by the HTTP clients in `wordcard-dict`; the API layer only ever
/// sees this trait.
pub trait Dictionary: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up `word` in language `lang` (e.g. `"en"`).
  fn lookup<'a>(
    &'a self,
    word: &'a str,
    lang: &'a str,
  ) -> impl Future<Output = Result<WordDefinition, Self::Error>> + Send + 'a;
}
