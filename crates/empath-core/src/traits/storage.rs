// SPDX-FileCopyrightText: 2026 Empath Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence collaborator for per-user conversational memory.

use async_trait::async_trait;

use crate::error::EmpathError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{UserId, UserMemory};

/// Durable per-user storage of the transcript and summary list.
///
/// Both operations are atomic: `load` never observes a half-applied `save`,
/// and a failed `save` leaves the previous state intact.
#[async_trait]
pub trait PersistentStore: PluginAdapter {
    /// Loads a user's memory; unknown users yield an empty [`UserMemory`].
    async fn load(&self, user: &UserId) -> Result<UserMemory, EmpathError>;

    /// Replaces the stored transcript with `memory.transcript` and appends
    /// any summaries beyond those already stored.
    ///
    /// Stored summaries are never rewritten or removed.
    async fn save(&self, user: &UserId, memory: &UserMemory) -> Result<(), EmpathError>;
}
