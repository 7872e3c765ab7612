//! [`Dao`] — the generic table gateway.
//!
//! Four primitives (insert, select, update, delete), each parameterised by
//! table name and built from the descriptor mapper and the clause builder.
//! The `*_rows` functions run against a borrowed connection so composite
//! operations can chain them inside one transaction; the async methods on
//! [`Dao`] run a single primitive as its own call.

use std::{
  path::Path,
  sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
  },
};

use rusqlite::{Connection, InterruptHandle, Row, Transaction, params_from_iter};
use tracing::{debug, info};
use wordcard_core::Cancel;

use crate::{
  Error, MappingError, Result,
  clause::{self, Conditions, Keyword, check_ident},
  entity::{self, Entity, Value},
  schema,
};

// ─── Gateway ─────────────────────────────────────────────────────────────────

/// Owns the single long-lived connection of a store.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct Dao {
  conn:      tokio_rusqlite::Connection,
  interrupt: Arc<InterruptHandle>,
  running:   Arc<Running>,
}

/// Which call, if any, currently owns the connection thread. An interrupt is
/// only issued while holding the slot and only for the call that occupies it.
#[derive(Default)]
struct Running {
  next: AtomicU64,
  slot: Mutex<Option<u64>>,
}

impl Running {
  fn ticket(&self) -> u64 { self.next.fetch_add(1, Ordering::Relaxed) }

  fn slot(&self) -> MutexGuard<'_, Option<u64>> {
    self.slot.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn enter(self: &Arc<Self>, id: u64) -> Occupied {
    *self.slot() = Some(id);
    Occupied { running: self.clone() }
  }
}

/// Clears the running slot when the closure leaves the connection thread.
struct Occupied {
  running: Arc<Running>,
}

impl Drop for Occupied {
  fn drop(&mut self) { *self.running.slot() = None; }
}

impl Dao {
  /// Open a store at `path`. The schema is created only if the file does not
  /// exist yet; an existing file is never migrated.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let fresh = !path.exists();
    info!(path = %path.display(), fresh, "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::bootstrap(conn, fresh).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::bootstrap(conn, true).await
  }

  async fn bootstrap(conn: tokio_rusqlite::Connection, create: bool) -> Result<Self> {
    let interrupt = conn
      .call(move |conn| {
        conn.execute_batch(schema::FOREIGN_KEYS)?;
        if create {
          create_tables(conn, &schema::TABLES)?;
        }
        Ok(conn.get_interrupt_handle())
      })
      .await?;

    Ok(Self {
      conn,
      interrupt: Arc::new(interrupt),
      running: Arc::new(Running::default()),
    })
  }

  /// Run `op` on the connection thread, honouring `cancel`.
  ///
  /// A signal that has already fired keeps `op` from running at all. One that
  /// fires while `op` runs interrupts the current statement; the call then
  /// waits for `op` to unwind so a transaction is rolled back before
  /// [`Error::Cancelled`] is returned. One that fires while the call is still
  /// queued behind another never touches the connection; `op` sees the signal
  /// when its turn comes and does not run. An `op` that completed before the
  /// interrupt landed reports its own outcome.
  pub(crate) async fn call<R, F>(&self, cancel: &Cancel, op: F) -> Result<R>
  where
    F: FnOnce(&mut Connection, &Cancel) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    ensure_live(cancel)?;

    let id = self.running.ticket();
    let running = self.running.clone();
    let gate = cancel.clone();
    let work = self.conn.call(move |conn| {
      let _occupied = running.enter(id);
      if gate.is_cancelled() {
        return Ok(Err(Error::Cancelled));
      }
      Ok(op(conn, &gate))
    });
    tokio::pin!(work);

    let outcome = tokio::select! {
      outcome = &mut work => outcome,
      () = cancel.cancelled() => {
        self.interrupt_if_running(id);
        work.await
      }
    };

    outcome?
  }

  /// Interrupt the connection only if call `id` is the one running on it.
  fn interrupt_if_running(&self, id: u64) {
    let slot = self.running.slot();
    if *slot == Some(id) {
      debug!(call = id, "cancellation requested; interrupting");
      self.interrupt.interrupt();
    } else {
      debug!(call = id, "cancellation requested while queued");
    }
  }

  /// Run `op` inside one transaction. Any error rolls every statement back;
  /// success commits once.
  pub async fn transaction<R, F>(&self, cancel: &Cancel, op: F) -> Result<R>
  where
    F: FnOnce(&Transaction<'_>, &Cancel) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    self
      .call(cancel, move |conn, gate| {
        let tx = conn.transaction()?;
        let out = op(&tx, gate)?;
        ensure_live(gate)?;
        tx.commit()?;
        Ok(out)
      })
      .await
  }

  /// `INSERT` one row into `table`, stamping its timestamp. Returns the new
  /// row id.
  pub async fn insert<T: Entity>(
    &self,
    table: &'static str,
    mut row: T,
    cancel: &Cancel,
  ) -> Result<i64> {
    self
      .call(cancel, move |conn, gate| insert_row(conn, gate, table, &mut row))
      .await
  }

  /// `SELECT fields FROM table WHERE conditions`, mapping every row with
  /// `map`. Empty `fields` selects all columns.
  pub async fn select<T, F>(
    &self,
    table: &'static str,
    conditions: Conditions,
    fields: &'static [&'static str],
    map: F,
    cancel: &Cancel,
  ) -> Result<Vec<T>>
  where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .call(cancel, move |conn, gate| {
        select_rows(conn, gate, table, &conditions, fields, map)
      })
      .await
  }

  /// `UPDATE table SET assignments WHERE conditions`. Returns rows affected.
  ///
  /// Empty `conditions` updates every row in the table.
  pub async fn update(
    &self,
    table: &'static str,
    assignments: Conditions,
    conditions: Conditions,
    cancel: &Cancel,
  ) -> Result<u64> {
    self
      .call(cancel, move |conn, gate| {
        update_rows(conn, gate, table, &assignments, &conditions)
      })
      .await
  }

  /// `DELETE FROM table WHERE conditions`. Returns rows affected.
  ///
  /// Empty `conditions` deletes every row in the table.
  pub async fn delete(
    &self,
    table: &'static str,
    conditions: Conditions,
    cancel: &Cancel,
  ) -> Result<u64> {
    self
      .call(cancel, move |conn, gate| delete_rows(conn, gate, table, &conditions))
      .await
  }
}

/// Run `tables` DDL in one transaction, so a failed bootstrap leaves no table
/// behind.
fn create_tables(conn: &mut Connection, tables: &[(&str, &str)]) -> rusqlite::Result<()> {
  let tx = conn.transaction()?;
  for (table, ddl) in tables {
    tx.execute_batch(ddl)?;
    info!(table, "created table");
  }
  tx.commit()
}

// ─── Primitives on a borrowed connection ─────────────────────────────────────

pub(crate) fn ensure_live(gate: &Cancel) -> Result<()> {
  if gate.is_cancelled() { Err(Error::Cancelled) } else { Ok(()) }
}

pub(crate) fn insert_row<T: Entity>(
  conn: &Connection,
  gate: &Cancel,
  table: &str,
  row: &mut T,
) -> Result<i64> {
  ensure_live(gate)?;
  check_ident(table)?;

  let (columns, args): (Vec<&str>, Vec<Value>) = entity::map(row)?.into_iter().unzip();
  let query = format!(
    "INSERT INTO {table} ({}) VALUES ({})",
    columns.join(", "),
    clause::placeholders(args.len()),
  );

  conn
    .execute(&query, params_from_iter(args.iter()))
    .map_err(|e| Error::store(&query, &args, e))?;

  let id = conn.last_insert_rowid();
  debug!(table, id, "insert");
  Ok(id)
}

pub(crate) fn select_rows<T>(
  conn: &Connection,
  gate: &Cancel,
  table: &str,
  conditions: &Conditions,
  fields: &[&str],
  map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
  ensure_live(gate)?;
  check_ident(table)?;
  for field in fields {
    check_ident(field)?;
  }

  let filter = clause::build(Keyword::Where, conditions)?;
  let projection = if fields.is_empty() { "*".to_owned() } else { fields.join(", ") };
  let query = format!("SELECT {projection} FROM {table}{}", filter.sql);

  let rows = query_all(conn, &query, &filter.args, map)
    .map_err(|e| Error::store(&query, &filter.args, e))?;
  debug!(table, rows = rows.len(), "select");
  Ok(rows)
}

pub(crate) fn update_rows(
  conn: &Connection,
  gate: &Cancel,
  table: &str,
  assignments: &Conditions,
  conditions: &Conditions,
) -> Result<u64> {
  ensure_live(gate)?;
  check_ident(table)?;
  if assignments.is_empty() {
    return Err(MappingError::EmptyAssignments { table: table.to_owned() }.into());
  }

  let set = clause::build(Keyword::Set, assignments)?;
  let filter = clause::build(Keyword::Where, conditions)?;
  let query = format!("UPDATE {table}{}{}", set.sql, filter.sql);
  let args: Vec<Value> = set.args.into_iter().chain(filter.args).collect();

  let n = conn
    .execute(&query, params_from_iter(args.iter()))
    .map_err(|e| Error::store(&query, &args, e))?;
  debug!(table, rows = n, "update");
  Ok(n as u64)
}

pub(crate) fn delete_rows(
  conn: &Connection,
  gate: &Cancel,
  table: &str,
  conditions: &Conditions,
) -> Result<u64> {
  ensure_live(gate)?;
  check_ident(table)?;

  let filter = clause::build(Keyword::Where, conditions)?;
  let query = format!("DELETE FROM {table}{}", filter.sql);

  let n = conn
    .execute(&query, params_from_iter(filter.args.iter()))
    .map_err(|e| Error::store(&query, &filter.args, e))?;
  debug!(table, rows = n, "delete");
  Ok(n as u64)
}

/// Prepare, run and drain `sql`. The cursor never outlives this call.
fn query_all<T>(
  conn: &Connection,
  sql: &str,
  args: &[Value],
  map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(params_from_iter(args.iter()), map)?
    .collect::<rusqlite::Result<Vec<_>>>();
  rows
}
