//! SQLite-backed entry store. Rows are only ever inserted; order is by rowid.

use super::RecordStore;
use crate::error::StoreError;
use crate::tracker::{DailyEntry, EntryStatus};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl ToSql for EntryStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// Only GREEN and RED are valid; any other stored value is a conversion error.
impl FromSql for EntryStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "GREEN" => Ok(EntryStatus::Green),
            "RED" => Ok(EntryStatus::Red),
            other => Err(FromSqlError::Other(
                format!("unknown entry status {other:?}").into(),
            )),
        }
    }
}

impl SqliteStore {
    /// Open or create DB at path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                time TEXT NOT NULL,
                usage_minutes INTEGER NOT NULL,
                task TEXT,
                status TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl RecordStore for SqliteStore {
    fn append(&self, entry: &DailyEntry) -> Result<(), StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)?.execute(
            "INSERT INTO entries (time, usage_minutes, task, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.time,
                entry.usage_minutes,
                entry.task,
                entry.status
            ],
        )?;
        Ok(())
    }

    fn all(&self) -> Result<Vec<DailyEntry>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut stmt =
            conn.prepare("SELECT time, usage_minutes, task, status FROM entries ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(DailyEntry {
                time: row.get(0)?,
                usage_minutes: row.get(1)?,
                task: row.get(2)?,
                status: row.get(3)?,
            })
        })?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
