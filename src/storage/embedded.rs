//! Embedded SQLite backend for development
//!
//! The working database lives in memory; durability is explicit. `initialize`
//! loads a previously saved file when one exists, and `persist` rewrites the
//! file from the in-memory state via the SQLite online-backup API. Nothing
//! is flushed automatically between those points.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::backup::Backup;
use rusqlite::{params_from_iter, Connection, OpenFlags};

use super::{Backend, BackendHandle, ExecOutcome, ResultSet};
use crate::schema;
use crate::value::SqlValue;
use crate::Result;

const BACKUP_PAGES_PER_STEP: std::ffi::c_int = 64;

pub struct EmbeddedBackend {
    // rusqlite connections are Send but not Sync
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl EmbeddedBackend {
    /// Open an in-memory engine tied to the given database file. No I/O
    /// happens until `initialize` or `persist`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let conn = new_memory_connection()?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.into(),
        })
    }

    /// Path of the file this backend loads from and saves to
    pub fn database_file(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn new_memory_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(conn)
}

/// Replace the in-memory state with the contents of the saved file
fn load_from_file(conn: &mut Connection, path: &Path) -> Result<()> {
    let src = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let backup = Backup::new(&src, conn)?;
    backup.run_to_completion(BACKUP_PAGES_PER_STEP, Duration::from_millis(0), None)?;
    Ok(())
}

/// Rewrite the saved file from the in-memory state. The copy is written to
/// a sibling temp file and renamed over the target, so the save also
/// replaces a file the backup API could not open as a database (corrupt or
/// truncated) and never leaves a half-written file behind.
fn persist_to_file(conn: &Connection, path: &Path) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);
    if tmp.exists() {
        std::fs::remove_file(&tmp)?;
    }

    {
        let mut dst = Connection::open(&tmp)?;
        let backup = Backup::new(conn, &mut dst)?;
        backup.run_to_completion(BACKUP_PAGES_PER_STEP, Duration::from_millis(0), None)?;
    }

    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn create_and_seed(conn: &Connection) -> Result<()> {
    for stmt in schema::all_schema_statements() {
        conn.execute(stmt, [])?;
    }
    let seeded: i64 = conn.query_row(schema::SEED_PROBE, [], |row| row.get(0))?;
    if seeded == 0 {
        for (sql, params) in schema::seed_statements()? {
            conn.execute(sql, params_from_iter(params.iter()))?;
        }
    }
    Ok(())
}

fn run_statement(conn: &Connection, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
    let rows_affected = conn.execute(sql, params_from_iter(params.iter()))? as u64;
    Ok(ExecOutcome {
        rows_affected,
        last_insert_id: conn.last_insert_rowid(),
    })
}

fn exec_statement(conn: &Connection, sql: &str, params: &[SqlValue]) -> Result<Vec<ResultSet>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
        let mut tuple = Vec::with_capacity(width);
        for i in 0..width {
            tuple.push(SqlValue::from(row.get_ref(i)?));
        }
        values.push(tuple);
    }

    Ok(vec![ResultSet { columns, values }])
}

#[async_trait]
impl Backend for EmbeddedBackend {
    async fn initialize(&self) -> Result<()> {
        let mut conn = self.lock();

        if self.path.exists() {
            match load_from_file(&mut conn, &self.path) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::error!(
                        "Error loading database file {}: {}",
                        self.path.display(),
                        e
                    );
                    // Treat an unreadable file as absent: start fresh and
                    // overwrite it below.
                    *conn = new_memory_connection()?;
                }
            }
        }

        create_and_seed(&conn)?;
        persist_to_file(&conn, &self.path)?;
        tracing::info!("Created development database at {}", self.path.display());
        Ok(())
    }

    async fn run(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
        run_statement(&self.lock(), sql, params)
    }

    async fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<ResultSet>> {
        exec_statement(&self.lock(), sql, params)
    }

    async fn persist(&self) -> Result<()> {
        persist_to_file(&self.lock(), &self.path)?;
        tracing::debug!("Database saved to {}", self.path.display());
        Ok(())
    }

    fn handle(&self) -> BackendHandle<'_> {
        BackendHandle::Embedded(self.lock())
    }
}
