// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user memory slots with write-through persistence.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use empath_core::error::EmpathError;
use empath_core::traits::storage::PersistentStore;
use empath_core::types::{SummaryRecord, Transcript, Turn, UserId, UserMemory};

/// A user's memory plus the transcript generation counter.
///
/// `epoch` advances whenever the transcript is reset, so a farewell that
/// summarized an older transcript can tell it was overtaken.
#[derive(Debug, Clone)]
struct UserSlot {
    memory: UserMemory,
    epoch: u64,
}

type Slot = Arc<Mutex<Option<UserSlot>>>;

/// Point-in-time copy of a user's memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySnapshot {
    pub transcript: Transcript,
    pub summaries: Vec<SummaryRecord>,
    /// Transcript generation this snapshot was taken from.
    pub epoch: u64,
}

impl MemorySnapshot {
    /// Summary texts, oldest first.
    pub fn summary_texts(&self) -> Vec<String> {
        self.summaries.iter().map(|s| s.summary.clone()).collect()
    }
}

/// The farewell transition computed outside the lock.
#[derive(Debug, Clone)]
pub struct FarewellCommit {
    /// Epoch of the snapshot the summary was built from.
    pub epoch: u64,
    /// Number of stored turns the summary covers (the farewell turn excluded).
    pub summarized_turns: usize,
    /// The farewell turn itself, summarized but never stored.
    pub turn: Turn,
    pub record: SummaryRecord,
}

/// Result of [`SessionMemoryStore::commit_farewell`].
#[derive(Debug, Clone, PartialEq)]
pub enum FarewellOutcome {
    /// Summary appended and the summarized turns removed.
    Committed,
    /// The transcript was cleared after the snapshot; nothing was written.
    Superseded,
}

/// Owns every user's transcript and summary list.
pub struct SessionMemoryStore {
    persistent: Arc<dyn PersistentStore>,
    users: DashMap<UserId, Slot>,
}

impl SessionMemoryStore {
    pub fn new(persistent: Arc<dyn PersistentStore>) -> Self {
        Self {
            persistent,
            users: DashMap::new(),
        }
    }

    fn slot(&self, user: &UserId) -> Slot {
        Arc::clone(self.users.entry(user.clone()).or_default().value())
    }

    /// Loads `user` from the persistent store the first time it is touched.
    async fn ensure_loaded<'a>(
        &self,
        user: &UserId,
        guard: &'a mut Option<UserSlot>,
    ) -> Result<&'a mut UserSlot, EmpathError> {
        let slot = match guard.take() {
            Some(slot) => slot,
            None => {
                let memory = self.persistent.load(user).await?;
                tracing::debug!(
                    user = %user,
                    turns = memory.transcript.len(),
                    summaries = memory.summaries.len(),
                    "user memory loaded"
                );
                UserSlot { memory, epoch: 0 }
            }
        };
        Ok(guard.insert(slot))
    }

    /// Applies `mutate` to a copy, persists it, then publishes it.
    ///
    /// If persistence fails, the visible state is left unchanged.
    async fn write_through<R>(
        &self,
        user: &UserId,
        mutate: impl FnOnce(&mut UserSlot) -> R,
    ) -> Result<R, EmpathError> {
        let slot = self.slot(user);
        let mut guard = slot.lock().await;
        let current = self.ensure_loaded(user, &mut guard).await?;

        let mut next = current.clone();
        let out = mutate(&mut next);
        self.persistent.save(user, &next.memory).await.inspect_err(|e| {
            tracing::error!(user = %user, error = %e, "memory write-through failed");
        })?;
        *current = next;
        Ok(out)
    }

    async fn read<R>(
        &self,
        user: &UserId,
        view: impl FnOnce(&UserSlot) -> R,
    ) -> Result<R, EmpathError> {
        let slot = self.slot(user);
        let mut guard = slot.lock().await;
        let current = self.ensure_loaded(user, &mut guard).await?;
        Ok(view(current))
    }

    /// Consistent copy of the transcript, summaries, and epoch.
    pub async fn snapshot(&self, user: &UserId) -> Result<MemorySnapshot, EmpathError> {
        self.read(user, |slot| MemorySnapshot {
            transcript: slot.memory.transcript.clone(),
            summaries: slot.memory.summaries.clone(),
            epoch: slot.epoch,
        })
        .await
    }

    /// The current transcript; empty on first access.
    pub async fn get_transcript(&self, user: &UserId) -> Result<Transcript, EmpathError> {
        self.read(user, |slot| slot.memory.transcript.clone()).await
    }

    /// Summary texts, oldest first.
    pub async fn get_summaries(&self, user: &UserId) -> Result<Vec<String>, EmpathError> {
        self.read(user, |slot| slot.memory.summary_texts()).await
    }

    pub async fn append_turn(&self, user: &UserId, turn: Turn) -> Result<(), EmpathError> {
        self.write_through(user, |slot| slot.memory.transcript.push(turn))
            .await
    }

    pub async fn append_summary(
        &self,
        user: &UserId,
        record: SummaryRecord,
    ) -> Result<(), EmpathError> {
        self.write_through(user, |slot| slot.memory.summaries.push(record))
            .await
    }

    /// Resets the transcript. Summaries are untouched. Idempotent.
    pub async fn clear_transcript(&self, user: &UserId) -> Result<(), EmpathError> {
        self.write_through(user, |slot| {
            slot.memory.transcript.clear();
            slot.epoch += 1;
        })
        .await?;
        tracing::info!(user = %user, "transcript cleared");
        Ok(())
    }

    /// Applies the farewell transition under one lock and one write.
    ///
    /// The summarized turns are removed and the summary appended together.
    /// Turns appended after the snapshot are kept. If the transcript was
    /// cleared since the snapshot, the summary describes forgotten turns and
    /// is dropped.
    pub async fn commit_farewell(
        &self,
        user: &UserId,
        commit: FarewellCommit,
    ) -> Result<FarewellOutcome, EmpathError> {
        let FarewellCommit {
            epoch,
            summarized_turns,
            turn,
            record,
        } = commit;

        let slot = self.slot(user);
        let mut guard = slot.lock().await;
        let current = self.ensure_loaded(user, &mut guard).await?;

        if current.epoch != epoch {
            tracing::warn!(
                user = %user,
                snapshot_epoch = epoch,
                current_epoch = current.epoch,
                "transcript cleared during farewell, summary discarded"
            );
            return Ok(FarewellOutcome::Superseded);
        }

        let mut next = current.clone();
        next.memory.transcript.drain_front(summarized_turns);
        next.memory.summaries.push(record);
        next.epoch += 1;

        self.persistent.save(user, &next.memory).await.inspect_err(|e| {
            tracing::error!(user = %user, error = %e, "farewell write-through failed");
        })?;
        *current = next;

        tracing::info!(
            user = %user,
            summarized_turns,
            farewell_emotion = %turn.emotion,
            summaries = current.memory.summaries.len(),
            "farewell committed"
        );
        Ok(FarewellOutcome::Committed)
    }

    /// Number of users with a loaded or loading slot.
    pub fn loaded_users(&self) -> usize {
        self.users.len()
    }
}
