// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed `StateStore`, grounded directly in the original
//! `StateManager`'s schema.

use crate::store::{StateRecord, StateStore};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use warden_core::{Clock, StateError, StateValue, StateValueKind};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    type TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// A `StateStore` backed by a single SQLite file, matching the table
/// shape the Python `StateManager` created with `sqlite3`.
pub struct SqliteStateStore {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl SqliteStateStore {
    /// Opens (creating if necessary) the database at `path`.
    pub fn open(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self, StateError> {
        let conn = Connection::open(path.as_ref()).map_err(|e| StateError::Io {
            key: "<open>".to_string(),
            source: Box::new(e),
        })?;
        conn.execute_batch(SCHEMA).map_err(|e| StateError::Io {
            key: "<schema>".to_string(),
            source: Box::new(e),
        })?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)), clock })
    }

    /// Opens an in-memory database, for tests that don't need a real
    /// file on disk.
    pub fn open_in_memory(clock: Arc<dyn Clock>) -> Result<Self, StateError> {
        let conn = Connection::open_in_memory().map_err(|e| StateError::Io {
            key: "<open>".to_string(),
            source: Box::new(e),
        })?;
        conn.execute_batch(SCHEMA).map_err(|e| StateError::Io {
            key: "<schema>".to_string(),
            source: Box::new(e),
        })?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)), clock })
    }

    fn io_err(key: &str, source: rusqlite::Error) -> StateError {
        StateError::Io { key: key.to_string(), source: Box::new(source) }
    }
}

impl StateStore for SqliteStateStore {
    fn set(&self, key: &str, value: StateValue) -> Result<(), StateError> {
        let conn = self.conn.lock();
        let now = self.clock.iso_now();
        conn.execute(
            "INSERT INTO state (key, value, type, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, type = excluded.type, updated_at = excluded.updated_at",
            params![key, value.encode(), value.kind().as_str(), now],
        )
        .map_err(|e| Self::io_err(key, e))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<StateRecord>, StateError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT value, type, updated_at FROM state WHERE key = ?1",
                params![key],
                |row| {
                    let value: String = row.get(0)?;
                    let kind: String = row.get(1)?;
                    let updated_at: String = row.get(2)?;
                    Ok((value, kind, updated_at))
                },
            )
            .optional()
            .map_err(|e| Self::io_err(key, e))?;

        let Some((value_text, kind_tag, updated_at)) = row else {
            return Ok(None);
        };
        let kind = StateValueKind::parse(&kind_tag).ok_or_else(|| StateError::Corrupt {
            key: key.to_string(),
            reason: format!("unknown type tag '{kind_tag}'"),
        })?;
        let value = StateValue::decode(kind, &value_text)
            .map_err(|reason| StateError::Corrupt { key: key.to_string(), reason })?;
        Ok(Some(StateRecord { key: key.to_string(), value, updated_at }))
    }

    fn delete(&self, key: &str) -> Result<bool, StateError> {
        let conn = self.conn.lock();
        let affected = conn
            .execute("DELETE FROM state WHERE key = ?1", params![key])
            .map_err(|e| Self::io_err(key, e))?;
        Ok(affected > 0)
    }

    fn keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StateError> {
        let conn = self.conn.lock();
        let mut stmt = match prefix {
            Some(_) => conn
                .prepare("SELECT key FROM state WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key")
                .map_err(|e| Self::io_err("<keys>", e))?,
            None => conn
                .prepare("SELECT key FROM state ORDER BY key")
                .map_err(|e| Self::io_err("<keys>", e))?,
        };
        let rows = match prefix {
            Some(p) => stmt.query_map(params![format!("{}%", escape_like(p))], |row| row.get::<_, String>(0)),
            None => stmt.query_map([], |row| row.get::<_, String>(0)),
        }
        .map_err(|e| Self::io_err("<keys>", e))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| Self::io_err("<keys>", e))?);
        }
        Ok(out)
    }
}

/// Escapes `LIKE` metacharacters (`%`, `_`, and the escape character
/// itself) so a literal prefix never matches as a wildcard pattern.
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
