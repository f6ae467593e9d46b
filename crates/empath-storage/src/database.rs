// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use empath_core::EmpathError;
use tokio_rusqlite::Connection;

use crate::migrations::run_migrations;

/// Convert a tokio-rusqlite error into `EmpathError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> EmpathError {
    EmpathError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single SQLite writer connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and migrates it.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, EmpathError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| EmpathError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| EmpathError::Storage {
                source: Box::new(e),
            })?;

        let db = Self { conn };
        db.configure(wal_mode).await?;
        db.migrate().await?;
        tracing::debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a migrated in-memory database.
    pub async fn open_in_memory() -> Result<Self, EmpathError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| EmpathError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.configure(false).await?;
        db.migrate().await?;
        Ok(db)
    }

    async fn configure(&self, wal_mode: bool) -> Result<(), EmpathError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                }
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.busy_timeout(std::time::Duration::from_secs(5))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn migrate(&self) -> Result<(), EmpathError> {
        self.conn
            .call(|conn| run_migrations(conn))
            .await
            .map_err(|e| EmpathError::Storage {
                source: Box::new(e),
            })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), EmpathError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
