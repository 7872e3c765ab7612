//! Integration tests for `Dao` and `SqliteStore` against SQLite.

use std::time::Duration;

use tokio::sync::oneshot;
use wordcard_core::{Cancel, ErrorClass, Classify as _, record::Record, store::WordStore};

use crate::{
  Conditions, Error, SqliteStore,
  dao::insert_row,
  entity::{ContextRow, MasteryRow, WordRow},
  schema::{CONTEXT, DEFINE, ID, MASTERED, MASTERED_FLAG, WORD, WORDS},
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn go() -> Cancel { Cancel::never() }

async fn count(s: &SqliteStore, table: &'static str) -> usize {
  s.dao()
    .select(table, Conditions::new(), &[], |_| Ok(()), &go())
    .await
    .unwrap()
    .len()
}

async fn counts(s: &SqliteStore) -> [usize; 4] {
  [
    count(s, WORDS).await,
    count(s, CONTEXT).await,
    count(s, DEFINE).await,
    count(s, MASTERED).await,
  ]
}

async fn insert_words(s: &SqliteStore, words: &[&str]) -> Vec<i64> {
  let mut ids = Vec::with_capacity(words.len());
  for word in words {
    ids.push(s.dao().insert(WORDS, WordRow::new(*word), &go()).await.unwrap());
  }
  ids
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
  v.sort();
  v
}

fn full_record(word: &str) -> Record {
  Record::new(word)
    .with_context(format!("say {word} twice"))
    .with_context(format!("{word} in a sentence"))
    .with_definition("noun", "a thing")
    .with_definition("noun", "another thing")
    .with_definition("verb", "to do a thing")
}

// ─── Gateway primitives ──────────────────────────────────────────────────────

#[tokio::test]
async fn insert_then_list_words() {
  let s = store().await;
  let raw = ["test", "insert", "hello", "word"];

  let ids = insert_words(&s, &raw).await;
  assert_eq!(ids.len(), raw.len());

  let words = s.list_words(go()).await.unwrap();
  assert_eq!(sorted(words), sorted(raw.iter().map(|w| w.to_string()).collect()));
}

#[tokio::test]
async fn duplicate_word_is_a_constraint_violation() {
  let s = store().await;
  insert_words(&s, &["hello"]).await;

  let err = s
    .dao()
    .insert(WORDS, WordRow::new("hello"), &go())
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation(), "{err}");
  match &err {
    Error::Store { query, args, .. } => {
      assert_eq!(query, "INSERT INTO words (word, create_time) VALUES (?, ?)");
      assert_eq!(args[0], crate::Value::Text("hello".into()));
    }
    other => panic!("expected Store error, got {other:?}"),
  }
  assert_eq!(err.class(), ErrorClass::Internal);
  assert_eq!(count(&s, WORDS).await, 1);
}

#[tokio::test]
async fn words_are_case_sensitive() {
  let s = store().await;
  insert_words(&s, &["Hello", "hello"]).await;
  assert_eq!(count(&s, WORDS).await, 2);
}

#[tokio::test]
async fn insert_stamps_create_time() {
  let s = store().await;
  let before = chrono::Utc::now().timestamp();
  insert_words(&s, &["stamp"]).await;

  let times = s
    .dao()
    .select(WORDS, Conditions::new(), &["create_time"], |r| r.get::<_, i64>(0), &go())
    .await
    .unwrap();
  assert!(times[0] >= before);
}

#[tokio::test]
async fn select_without_fields_returns_all_columns() {
  let s = store().await;
  insert_words(&s, &["wide"]).await;

  let widths = s
    .dao()
    .select(WORDS, Conditions::new(), &[], |r| Ok(r.as_ref().column_count()), &go())
    .await
    .unwrap();
  assert_eq!(widths, vec![3]);
}

#[tokio::test]
async fn update_with_empty_conditions_touches_every_row() {
  let s = store().await;
  let ids = insert_words(&s, &["a", "b", "c"]).await;
  for id in &ids {
    s.dao().insert(MASTERED, MasteryRow::new(*id, false), &go()).await.unwrap();
  }

  let n = s
    .dao()
    .update(
      MASTERED,
      Conditions::new().and(MASTERED_FLAG, true),
      Conditions::new(),
      &go(),
    )
    .await
    .unwrap();
  assert_eq!(n, 3);
  for id in ids {
    assert!(s.is_mastered(id, go()).await.unwrap());
  }
}

#[tokio::test]
async fn update_without_assignments_is_rejected() {
  let s = store().await;
  let err = s
    .dao()
    .update(MASTERED, Conditions::new(), Conditions::new(), &go())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Mapping(_)));
  assert_eq!(err.class(), ErrorClass::Invalid);
}

#[tokio::test]
async fn delete_matches_conditions_only() {
  let s = store().await;
  let ids = insert_words(&s, &["keep", "drop"]).await;

  let n = s
    .dao()
    .delete(WORDS, Conditions::new().and(ID, ids[1]), &go())
    .await
    .unwrap();
  assert_eq!(n, 1);
  assert_eq!(s.list_words(go()).await.unwrap(), vec!["keep".to_string()]);
}

#[tokio::test]
async fn orphan_rows_are_rejected() {
  let s = store().await;
  let err = s
    .dao()
    .insert(CONTEXT, ContextRow::new(9_999, "nobody"), &go())
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation(), "{err}");
}

#[tokio::test]
async fn transaction_error_rolls_back() {
  let s = store().await;

  let err = s
    .dao()
    .transaction(&go(), |tx, gate| {
      insert_row(tx, gate, WORDS, &mut WordRow::new("ghost"))?;
      Err::<(), _>(Error::NotFound("ghost".into()))
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
  assert_eq!(count(&s, WORDS).await, 0);
}

// ─── Cancellation ────────────────────────────────────────────────────────────

#[tokio::test]
async fn fired_signal_prevents_the_write() {
  let s = store().await;
  let (handle, cancel) = Cancel::pair();
  handle.cancel();

  let err = s.insert_record(full_record("late"), cancel).await.unwrap_err();
  assert!(matches!(err, Error::Cancelled));
  assert_eq!(err.class(), ErrorClass::Cancelled);
  assert_eq!(counts(&s).await, [0, 0, 0, 0]);
}

#[tokio::test]
async fn elapsed_deadline_is_a_cancellation() {
  let s = store().await;
  let cancel = Cancel::never().with_timeout(Duration::ZERO);
  let err = s.list_words(cancel).await.unwrap_err();
  assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn cancellation_mid_transaction_rolls_back() {
  let s = store().await;
  let (handle, cancel) = Cancel::pair();

  let err = s
    .dao()
    .transaction(&cancel, move |tx, gate| {
      insert_row(tx, gate, WORDS, &mut WordRow::new("half"))?;
      handle.cancel();
      insert_row(tx, gate, WORDS, &mut WordRow::new("never"))?;
      Ok(())
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Cancelled));
  assert_eq!(count(&s, WORDS).await, 0);
}

/// Inserts `?1` generated words in one statement.
const FILL: &str = "
WITH RECURSIVE seq(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM seq LIMIT ?1)
INSERT INTO words (word, create_time) SELECT 'w' || x, 0 FROM seq";

async fn fill_words(s: &SqliteStore, n: i64) {
  s.dao()
    .transaction(&go(), move |tx, _| {
      tx.execute(FILL, [n])?;
      Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_a_running_statement_rolls_back() {
  let s = store().await;
  let (handle, cancel) = Cancel::pair();
  let (started_tx, started_rx) = oneshot::channel();

  let task = {
    let s = s.clone();
    tokio::spawn(async move {
      s.dao()
        .transaction(&cancel, move |tx, _| {
          tx.execute(FILL, [20_000_i64])?;
          let _ = started_tx.send(());
          // Never finishes on its own.
          let n: i64 =
            tx.query_row("SELECT count(*) FROM words a, words b, words c", [], |r| r.get(0))?;
          Ok(n)
        })
        .await
    })
  };

  started_rx.await.unwrap();
  tokio::time::sleep(Duration::from_millis(100)).await;
  handle.cancel();

  let err = tokio::time::timeout(Duration::from_secs(10), task)
    .await
    .expect("interrupt did not stop the statement")
    .unwrap()
    .unwrap_err();
  assert!(matches!(err, Error::Cancelled), "{err}");
  assert_eq!(counts(&s).await, [0, 0, 0, 0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_a_queued_call_leaves_the_running_one_alone() {
  let s = store().await;
  fill_words(&s, 4_000).await;
  let (started_tx, started_rx) = oneshot::channel();

  let busy = {
    let s = s.clone();
    tokio::spawn(async move {
      s.dao()
        .transaction(&go(), move |tx, _| {
          let _ = started_tx.send(());
          let n: i64 =
            tx.query_row("SELECT count(*) FROM words a, words b", [], |r| r.get(0))?;
          Ok(n)
        })
        .await
    })
  };
  started_rx.await.unwrap();

  let (handle, cancel) = Cancel::pair();
  let queued = {
    let s = s.clone();
    tokio::spawn(async move { s.list_words(cancel).await })
  };
  tokio::time::sleep(Duration::from_millis(20)).await;
  assert!(!busy.is_finished());
  handle.cancel();

  let queued = queued.await.unwrap();
  assert!(matches!(queued, Err(Error::Cancelled)), "{queued:?}");

  let busy = busy.await.unwrap();
  assert_eq!(busy.unwrap(), 4_000 * 4_000);
  assert_eq!(count(&s, WORDS).await, 4_000);
}

// ─── Composite operations ────────────────────────────────────────────────────

#[tokio::test]
async fn insert_record_writes_every_table() {
  let s = store().await;
  let id = s.insert_record(full_record("hello"), go()).await.unwrap();
  assert!(id > 0);
  assert_eq!(counts(&s).await, [1, 2, 3, 1]);

  let record = s.assemble_record("hello", go()).await.unwrap();
  assert_eq!(record.word, "hello");
  assert_eq!(record.contexts, vec!["say hello twice", "hello in a sentence"]);
  assert_eq!(record.definitions["noun"], vec!["a thing", "another thing"]);
  assert_eq!(record.definitions["verb"], vec!["to do a thing"]);
  assert!(!record.mastered);
}

#[tokio::test]
async fn failed_insert_record_leaves_no_rows() {
  let s = store().await;
  s.insert_record(Record::new("hello"), go()).await.unwrap();
  let before = counts(&s).await;

  let err = s.insert_record(full_record("hello"), go()).await.unwrap_err();
  assert!(err.is_constraint_violation(), "{err}");
  assert_eq!(counts(&s).await, before);
}

#[tokio::test]
async fn invalid_record_is_rejected_before_writing() {
  let s = store().await;
  let err = s.insert_record(Record::new("   "), go()).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::Invalid);
  assert_eq!(counts(&s).await, [0, 0, 0, 0]);
}

#[tokio::test]
async fn find_word_resolves_ids() {
  let s = store().await;
  let id = s.insert_record(Record::new("find"), go()).await.unwrap();
  assert_eq!(s.find_word("find", go()).await.unwrap(), Some(id));
  assert_eq!(s.find_word("lost", go()).await.unwrap(), None);
}

#[tokio::test]
async fn append_context_to_existing_word() {
  let s = store().await;
  let id = s.insert_record(Record::new("grow"), go()).await.unwrap();
  s.append_context(id, "grow up".into(), go()).await.unwrap();
  s.append_context(id, "grow old".into(), go()).await.unwrap();

  let record = s.assemble_record("grow", go()).await.unwrap();
  assert_eq!(record.contexts, vec!["grow up", "grow old"]);
}

#[tokio::test]
async fn master_word_then_assemble_reports_mastered() {
  let s = store().await;
  let id = s.insert_record(Record::new("learn"), go()).await.unwrap();

  s.master_word(id, true, go()).await.unwrap();
  assert!(s.assemble_record("learn", go()).await.unwrap().mastered);
  assert_eq!(count(&s, MASTERED).await, 1);

  s.master_word(id, false, go()).await.unwrap();
  assert!(!s.is_mastered(id, go()).await.unwrap());
  assert_eq!(count(&s, MASTERED).await, 1);
}

#[tokio::test]
async fn master_word_inserts_missing_mastery_row() {
  let s = store().await;
  let id = insert_words(&s, &["bare"]).await[0];
  assert_eq!(count(&s, MASTERED).await, 0);
  assert!(!s.is_mastered(id, go()).await.unwrap());

  s.master_word(id, true, go()).await.unwrap();
  assert_eq!(count(&s, MASTERED).await, 1);
  assert!(s.is_mastered(id, go()).await.unwrap());
}

#[tokio::test]
async fn master_unknown_word_fails() {
  let s = store().await;
  let err = s.master_word(404, true, go()).await.unwrap_err();
  assert!(err.is_constraint_violation(), "{err}");
}

#[tokio::test]
async fn delete_word_cascades_to_dependents() {
  let s = store().await;
  let gone = s.insert_record(full_record("gone"), go()).await.unwrap();
  s.insert_record(full_record("kept"), go()).await.unwrap();
  s.master_word(gone, true, go()).await.unwrap();

  assert!(s.delete_word(gone, go()).await.unwrap());
  assert_eq!(counts(&s).await, [1, 2, 3, 1]);

  let dangling = s
    .dao()
    .select(CONTEXT, Conditions::new().and(WORD, gone), &[], |_| Ok(()), &go())
    .await
    .unwrap();
  assert!(dangling.is_empty());

  let err = s.assemble_record("gone", go()).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
  assert!(!s.delete_word(gone, go()).await.unwrap());
}

#[tokio::test]
async fn purge_returns_word_count_and_empties_store() {
  let s = store().await;
  s.insert_record(full_record("test"), go()).await.unwrap();
  s.insert_record(full_record("purge"), go()).await.unwrap();

  assert_eq!(s.purge(go()).await.unwrap(), 2);
  assert!(s.list_words(go()).await.unwrap().is_empty());
  assert_eq!(counts(&s).await, [0, 0, 0, 0]);
}

#[tokio::test]
async fn assemble_unknown_word_is_not_found() {
  let s = store().await;
  let err = s.assemble_record("nothing", go()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(ref w) if w == "nothing"));
}

#[tokio::test]
async fn list_records_assembles_every_word() {
  let s = store().await;
  s.insert_record(full_record("one"), go()).await.unwrap();
  s.insert_record(Record::new("two"), go()).await.unwrap();

  let records = s.list_records(go()).await.unwrap();
  assert_eq!(records.len(), 2);
  assert_eq!(records[0], s.assemble_record("one", go()).await.unwrap());
  assert_eq!(records[1], Record::new("two"));
}

// ─── On-disk bootstrap ───────────────────────────────────────────────────────

#[tokio::test]
async fn reopened_file_keeps_data_and_cascade() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("words.db");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert_record(full_record("persist"), go()).await.unwrap()
  };
  assert!(path.exists());

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.list_words(go()).await.unwrap(), vec!["persist".to_string()]);

  assert!(s.delete_word(id, go()).await.unwrap());
  assert_eq!(counts(&s).await, [0, 0, 0, 0]);
}
