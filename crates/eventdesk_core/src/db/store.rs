//! Snapshot store and statement handles.
//!
//! # Responsibility
//! - Run SQLite fully in memory and persist it as one snapshot file.
//! - Expose prepared-statement execution with mutation and read semantics.
//!
//! # Invariants
//! - All statement execution serializes on one internal connection lock.
//! - Mutating executions flush the whole database to disk before returning;
//!   a failed flush surfaces as `DbError::SnapshotWrite` to that caller.
//! - Reads never touch disk.
//! - One process owns a given snapshot file at a time.

use super::{schema, DbError, DbResult};
use log::{error, info, warn};
use rusqlite::backup::Backup;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Params, Row};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

const BACKUP_PAGES_PER_STEP: std::os::raw::c_int = 128;

/// Owner of the in-memory SQLite engine and its on-disk snapshot file.
///
/// Constructed once at process start and passed by reference to every
/// component that needs storage; no process-wide lookup exists.
pub struct SnapshotStore {
    conn: Mutex<Connection>,
    snapshot_path: Option<PathBuf>,
}

impl SnapshotStore {
    /// Opens a file-backed store, loading the snapshot if one exists.
    ///
    /// # Contract
    /// - An existing snapshot is imported into the in-memory engine; a
    ///   corrupt or unreadable file fails with `DbError::SnapshotLoad`.
    /// - Schema DDL is applied idempotently and defaults are seeded on
    ///   first run, after which the store is flushed once so a fresh
    ///   database is durable before `open` returns.
    ///
    /// # Side effects
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let started_at = Instant::now();
        info!(
            "event=store_open module=db status=start path={}",
            path.display()
        );

        let result = Self::open_inner(path.clone());
        match &result {
            Ok(_) => info!(
                "event=store_open module=db status=ok path={} duration_ms={}",
                path.display(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_open module=db status=error path={} duration_ms={} error={err}",
                path.display(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    /// Opens an ephemeral store with no snapshot file. Flushes are no-ops.
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            snapshot_path: None,
        };
        store.bootstrap()?;
        Ok(store)
    }

    fn open_inner(path: PathBuf) -> DbResult<Self> {
        let mut conn = Connection::open_in_memory()?;
        if path.exists() {
            load_snapshot(&mut conn, &path)?;
        }

        let store = Self {
            conn: Mutex::new(conn),
            snapshot_path: Some(path),
        };
        store.bootstrap()?;

        let conn = store.lock_conn();
        store.flush_locked(&conn)?;
        drop(conn);
        Ok(store)
    }

    fn bootstrap(&self) -> DbResult<()> {
        self.configure("foreign_keys = ON");
        let conn = self.lock_conn();
        schema::apply_schema(&conn)?;
        schema::seed_defaults(&conn)?;
        Ok(())
    }

    /// Binds statement text to this store.
    ///
    /// No execution or validation happens here; malformed statement text
    /// surfaces as an error from the first execution call.
    pub fn prepare(&self, sql: impl Into<String>) -> Statement<'_> {
        Statement {
            store: self,
            sql: sql.into(),
        }
    }

    /// Executes a raw SQL batch (DDL or multi-statement scripts).
    ///
    /// Treated as mutating: the snapshot is flushed before returning.
    pub fn exec(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock_conn();
        conn.execute_batch(sql)?;
        self.flush_locked(&conn)
    }

    /// Applies an engine configuration pragma on a best-effort basis.
    ///
    /// Returns whether the pragma was accepted. An unsupported or malformed
    /// pragma is logged as a fallback and never fails the caller.
    pub fn configure(&self, pragma: &str) -> bool {
        let conn = self.lock_conn();
        match apply_pragma(&conn, pragma) {
            Ok(()) => {
                info!("event=store_configure module=db status=ok pragma=\"{pragma}\"");
                true
            }
            Err(err) => {
                warn!(
                    "event=store_configure module=db status=fallback pragma=\"{pragma}\" error={err}"
                );
                false
            }
        }
    }

    /// Returns the snapshot file path, if this store is file-backed.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush_locked(&self, conn: &Connection) -> DbResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        write_snapshot(conn, path).map_err(|message| {
            error!(
                "event=store_flush module=db status=error path={} error={message}",
                path.display()
            );
            DbError::SnapshotWrite {
                path: path.clone(),
                message,
            }
        })
    }
}

/// A bound, executable statement against the snapshot store.
pub struct Statement<'store> {
    store: &'store SnapshotStore,
    sql: String,
}

/// Result of a mutating statement execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Number of rows changed by the statement.
    pub rows_affected: usize,
    /// Rowid of the inserted row. Meaningful for INSERT statements only;
    /// for other statements this reports the engine's last insert rowid
    /// (0 when nothing has been inserted on this store yet).
    pub inserted_id: i64,
}

impl Statement<'_> {
    /// Executes a mutating statement.
    ///
    /// The snapshot flush completes (or fails loudly) before this returns,
    /// with the engine lock held across execute-and-flush so no other
    /// mutation interleaves.
    pub fn run<P: Params>(&self, params: P) -> DbResult<RunOutcome> {
        let conn = self.store.lock_conn();
        let mut stmt = conn.prepare(&self.sql)?;
        let rows_affected = stmt.execute(params)?;
        drop(stmt);
        let inserted_id = conn.last_insert_rowid();
        self.store.flush_locked(&conn)?;
        Ok(RunOutcome {
            rows_affected,
            inserted_id,
        })
    }

    /// Executes a read expected to match at most one row.
    pub fn get_one<P: Params>(&self, params: P) -> DbResult<Option<Record>> {
        let conn = self.store.lock_conn();
        let mut stmt = conn.prepare(&self.sql)?;
        let columns = owned_column_names(&stmt);
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => Ok(Some(Record::from_row(&columns, row)?)),
            None => Ok(None),
        }
    }

    /// Executes a read and eagerly materializes every matching row.
    ///
    /// Row order is engine order unless the statement orders explicitly.
    pub fn get_all<P: Params>(&self, params: P) -> DbResult<Vec<Record>> {
        let conn = self.store.lock_conn();
        let mut stmt = conn.prepare(&self.sql)?;
        let columns = owned_column_names(&stmt);
        let mut rows = stmt.query(params)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(Record::from_row(&columns, row)?);
        }
        Ok(records)
    }
}

/// One materialized result row: an owned column-name to value mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: HashMap<String, Value>,
}

impl Record {
    fn from_row(columns: &[String], row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut values = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            values.insert(column.clone(), row.get::<_, Value>(index)?);
        }
        Ok(Self { values })
    }

    /// Returns the value stored under `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Iterates over the column names present in this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn owned_column_names(stmt: &rusqlite::Statement<'_>) -> Vec<String> {
    stmt.column_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn apply_pragma(conn: &Connection, pragma: &str) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA {pragma};"))?;
    // Some pragmas report their new value as a result row; drain instead of
    // treating that as an execution error.
    let mut rows = stmt.query([])?;
    while rows.next()?.is_some() {}
    Ok(())
}

fn load_snapshot(conn: &mut Connection, path: &Path) -> DbResult<()> {
    let snapshot_load = |source: rusqlite::Error| DbError::SnapshotLoad {
        path: path.to_path_buf(),
        source,
    };

    let source_db = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(snapshot_load)?;

    let backup = Backup::new(&source_db, conn).map_err(snapshot_load)?;
    backup
        .run_to_completion(BACKUP_PAGES_PER_STEP, Duration::ZERO, None)
        .map_err(snapshot_load)?;
    Ok(())
}

fn write_snapshot(conn: &Connection, path: &Path) -> Result<(), String> {
    let temp_path = path.with_extension("tmp");
    let _ = fs::remove_file(&temp_path);

    let mut destination =
        Connection::open(&temp_path).map_err(|err| format!("open temp snapshot: {err}"))?;
    {
        let backup = Backup::new(conn, &mut destination)
            .map_err(|err| format!("begin snapshot copy: {err}"))?;
        backup
            .run_to_completion(BACKUP_PAGES_PER_STEP, Duration::ZERO, None)
            .map_err(|err| format!("copy snapshot pages: {err}"))?;
    }
    if let Err((_conn, err)) = destination.close() {
        return Err(format!("close temp snapshot: {err}"));
    }
    fs::rename(&temp_path, path).map_err(|err| format!("replace snapshot file: {err}"))?;
    Ok(())
}
