// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the PersistentStore trait.

use async_trait::async_trait;
use tracing::debug;

use empath_config::model::StorageConfig;
use empath_core::types::{UserId, UserMemory};
use empath_core::{AdapterType, EmpathError, HealthStatus, PersistentStore, PluginAdapter};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed store for per-user transcripts and summaries.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Opens the database named in `config`, running migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, EmpathError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite store initialized");
        Ok(Self { db })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    /// Checkpoints the WAL before shutdown.
    pub async fn close(&self) -> Result<(), EmpathError> {
        self.db.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, EmpathError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PersistentStore for SqliteStore {
    async fn load(&self, user: &UserId) -> Result<UserMemory, EmpathError> {
        let user_id = user.as_str().to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<UserMemory, rusqlite::Error> {
                let tx = conn.transaction()?;
                let transcript = queries::turns::load_transcript(&tx, &user_id)?;
                let summaries = queries::summaries::load_summaries(&tx, &user_id)?;
                tx.commit()?;
                Ok(UserMemory {
                    transcript,
                    summaries,
                })
            })
            .await
            .map_err(map_tr_err)
    }

    async fn save(&self, user: &UserId, memory: &UserMemory) -> Result<(), EmpathError> {
        let user_id = user.as_str().to_string();
        let turns = memory.transcript.len();
        let memory = memory.clone();
        let added = self
            .db
            .connection()
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction()?;
                queries::turns::replace_transcript(&tx, &user_id, &memory.transcript)?;
                let added = queries::summaries::append_new(&tx, &user_id, &memory.summaries)?;
                tx.commit()?;
                Ok(added)
            })
            .await
            .map_err(map_tr_err)?;
        debug!(user = %user, turns, summaries_added = added, "memory saved");
        Ok(())
    }
}
