//! [`SqliteStore`] — the SQLite implementation of [`WordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;
use wordcard_core::{
  Cancel,
  record::{Definitions, Record, WordId},
  store::WordStore,
};

use crate::{
  Error, Result,
  clause::Conditions,
  dao::{Dao, insert_row, select_rows, update_rows},
  encode::{decode_definition, decode_flag, decode_id, decode_text},
  entity::{ContextRow, DefinitionRow, MasteryRow, WordRow},
  schema::{
    CATEGORY, CONTEXT, CONTEXT_TEXT, DEFINE, DEFINE_TEXT, ID, MASTERED, MASTERED_FLAG,
    UPDATE_TIME, WORD, WORDS,
  },
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A vocabulary store backed by a single SQLite file.
///
/// Owns exactly one [`Dao`]; every operation goes through it. Cloning is
/// cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  dao: Dao,
}

impl SqliteStore {
  /// Open (or create) a store at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Self { dao: Dao::open(path).await? })
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Ok(Self { dao: Dao::open_in_memory().await? })
  }

  /// The gateway this store runs on.
  pub fn dao(&self) -> &Dao { &self.dao }
}

// ─── Reads on a borrowed connection ──────────────────────────────────────────

fn find_word_id(conn: &Connection, gate: &Cancel, word: &str) -> Result<Option<WordId>> {
  let ids = select_rows(
    conn,
    gate,
    WORDS,
    &Conditions::new().and(WORD, word),
    &[ID],
    decode_id,
  )?;
  Ok(ids.into_iter().next())
}

fn mastery_of(conn: &Connection, gate: &Cancel, word_id: WordId) -> Result<bool> {
  let flags = select_rows(
    conn,
    gate,
    MASTERED,
    &Conditions::new().and(WORD, word_id),
    &[MASTERED_FLAG],
    decode_flag,
  )?;
  // Without a uniqueness constraint the most recent row wins.
  Ok(flags.last().copied().unwrap_or(false))
}

fn assemble(conn: &Connection, gate: &Cancel, word: &str) -> Result<Record> {
  let word_id =
    find_word_id(conn, gate, word)?.ok_or_else(|| Error::NotFound(word.to_owned()))?;
  let by_word = Conditions::new().and(WORD, word_id);

  let contexts = select_rows(conn, gate, CONTEXT, &by_word, &[CONTEXT_TEXT], decode_text)?;

  let mut definitions = Definitions::new();
  for (category, text) in
    select_rows(conn, gate, DEFINE, &by_word, &[CATEGORY, DEFINE_TEXT], decode_definition)?
  {
    definitions.entry(category).or_default().push(text);
  }

  let mastered = mastery_of(conn, gate, word_id)?;

  Ok(Record { word: word.to_owned(), contexts, mastered, definitions })
}

// ─── WordStore impl ──────────────────────────────────────────────────────────

impl WordStore for SqliteStore {
  type Error = Error;

  // ── Words ─────────────────────────────────────────────────────────────────

  async fn list_words(&self, cancel: Cancel) -> Result<Vec<String>> {
    self
      .dao
      .select(WORDS, Conditions::new(), &[WORD], decode_text, &cancel)
      .await
  }

  async fn find_word(&self, word: &str, cancel: Cancel) -> Result<Option<WordId>> {
    let word = word.to_owned();
    self
      .dao
      .call(&cancel, move |conn, gate| find_word_id(conn, gate, &word))
      .await
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_record(&self, record: Record, cancel: Cancel) -> Result<WordId> {
    record.validate()?;
    let word = record.word.clone();

    let word_id = self
      .dao
      .transaction(&cancel, move |tx, gate| {
        let word_id = insert_row(tx, gate, WORDS, &mut WordRow::new(record.word))?;
        insert_row(tx, gate, MASTERED, &mut MasteryRow::new(word_id, false))?;

        for context in record.contexts {
          insert_row(tx, gate, CONTEXT, &mut ContextRow::new(word_id, context))?;
        }

        for (category, texts) in record.definitions {
          for text in texts {
            insert_row(
              tx,
              gate,
              DEFINE,
              &mut DefinitionRow::new(word_id, category.as_str(), text),
            )?;
          }
        }

        Ok(word_id)
      })
      .await?;

    info!(word = %word, word_id, "record stored");
    Ok(word_id)
  }

  async fn append_context(
    &self,
    word_id: WordId,
    context: String,
    cancel: Cancel,
  ) -> Result<i64> {
    if context.trim().is_empty() {
      return Err(wordcard_core::Error::EmptyContext(word_id.to_string()).into());
    }
    self
      .dao
      .insert(CONTEXT, ContextRow::new(word_id, context), &cancel)
      .await
  }

  async fn master_word(&self, word_id: WordId, mastered: bool, cancel: Cancel) -> Result<()> {
    let inserted = self
      .dao
      .transaction(&cancel, move |tx, gate| {
        let updated = update_rows(
          tx,
          gate,
          MASTERED,
          &Conditions::new()
            .and(MASTERED_FLAG, mastered)
            .and(UPDATE_TIME, Utc::now().timestamp()),
          &Conditions::new().and(WORD, word_id),
        )?;
        if updated > 0 {
          return Ok(false);
        }
        insert_row(tx, gate, MASTERED, &mut MasteryRow::new(word_id, mastered))?;
        Ok(true)
      })
      .await?;

    info!(word_id, mastered, inserted, "mastery updated");
    Ok(())
  }

  async fn delete_word(&self, word_id: WordId, cancel: Cancel) -> Result<bool> {
    let n = self
      .dao
      .delete(WORDS, Conditions::new().and(ID, word_id), &cancel)
      .await?;
    info!(word_id, deleted = n > 0, "word deleted");
    Ok(n > 0)
  }

  async fn purge(&self, cancel: Cancel) -> Result<u64> {
    let n = self
      .dao
      .delete(WORDS, Conditions::new(), &cancel)
      .await?;
    info!(words = n, "store purged");
    Ok(n)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn is_mastered(&self, word_id: WordId, cancel: Cancel) -> Result<bool> {
    self
      .dao
      .call(&cancel, move |conn, gate| mastery_of(conn, gate, word_id))
      .await
  }

  async fn assemble_record(&self, word: &str, cancel: Cancel) -> Result<Record> {
    let word = word.to_owned();
    self
      .dao
      .transaction(&cancel, move |tx, gate| assemble(tx, gate, &word))
      .await
  }

  async fn list_records(&self, cancel: Cancel) -> Result<Vec<Record>> {
    self
      .dao
      .transaction(&cancel, move |tx, gate| {
        let words = select_rows(tx, gate, WORDS, &Conditions::new(), &[WORD], decode_text)?;
        words.iter().map(|w| assemble(tx, gate, w)).collect()
      })
      .await
  }
}
