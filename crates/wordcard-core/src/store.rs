//! The `WordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `wordcard-store-sqlite`).
//! Higher layers (`wordcard-api`, `wordcard-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  cancel::Cancel,
  error::Classify,
  record::{Record, WordId},
};

/// Abstraction over a vocabulary store backend.
///
/// Every method takes a [`Cancel`]; a fired signal aborts the in-flight call
/// and surfaces a cancellation error instead of a store error.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait WordStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Words ─────────────────────────────────────────────────────────────

  /// Every stored word text, in storage order.
  fn list_words(
    &self,
    cancel: Cancel,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Resolve a word text to its id. Returns `None` if it is not stored.
  fn find_word<'a>(
    &'a self,
    word: &'a str,
    cancel: Cancel,
  ) -> impl Future<Output = Result<Option<WordId>, Self::Error>> + Send + 'a;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Atomically store a word with a fresh (unmastered) mastery state, its
  /// contexts and its definitions. Either every row is written or none is.
  fn insert_record(
    &self,
    record: Record,
    cancel: Cancel,
  ) -> impl Future<Output = Result<WordId, Self::Error>> + Send + '_;

  /// Append one usage context to an existing word.
  fn append_context(
    &self,
    word_id: WordId,
    context: String,
    cancel: Cancel,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Set the mastery flag of a word, creating its mastery row if it has none.
  fn master_word(
    &self,
    word_id: WordId,
    mastered: bool,
    cancel: Cancel,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a word and, by cascade, everything referencing it. Returns
  /// `false` if no such word existed.
  fn delete_word(
    &self,
    word_id: WordId,
    cancel: Cancel,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every word. Returns the number of words removed.
  fn purge(
    &self,
    cancel: Cancel,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The mastery flag of a word; `false` when it has no mastery row.
  fn is_mastered(
    &self,
    word_id: WordId,
    cancel: Cancel,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Assemble the full [`Record`] for a word text. Fails with a
  /// [`NotFound`](crate::ErrorClass::NotFound)-class error if it is not
  /// stored.
  fn assemble_record<'a>(
    &'a self,
    word: &'a str,
    cancel: Cancel,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + 'a;

  /// Assemble every stored record.
  fn list_records(
    &self,
    cancel: Cancel,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;
}
